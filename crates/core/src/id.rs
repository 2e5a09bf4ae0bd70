// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job and step identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for "no value" in numeric fields (batch jobs have no step).
pub const NO_VAL: u32 = 0xffff_fffe;

/// Cluster-assigned job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u32);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for JobId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Step identifier within a job.
///
/// Batch jobs carry [`StepId::NONE`], which serializes as [`NO_VAL`] so the
/// persisted layout stays a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(u32);

impl StepId {
    pub const NONE: StepId = StepId(NO_VAL);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn is_none(&self) -> bool {
        self.0 == NO_VAL
    }

    pub fn get(&self) -> Option<u32> {
        if self.is_none() {
            None
        } else {
            Some(self.0)
        }
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl From<u32> for StepId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("batch"),
        }
    }
}

/// Key addressing one step: `(job id, step id)`.
///
/// Displays as `"12.3"` for steps and `"12"` for batch jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepKey {
    pub job_id: JobId,
    pub step_id: StepId,
}

impl StepKey {
    pub fn new(job_id: impl Into<JobId>, step_id: impl Into<StepId>) -> Self {
        Self { job_id: job_id.into(), step_id: step_id.into() }
    }

    pub fn batch(job_id: impl Into<JobId>) -> Self {
        Self { job_id: job_id.into(), step_id: StepId::NONE }
    }

    pub fn is_batch(&self) -> bool {
        self.step_id.is_none()
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step_id.get() {
            Some(step) => write!(f, "{}.{}", self.job_id, step),
            None => write!(f, "{}", self.job_id),
        }
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
