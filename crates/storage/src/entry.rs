// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use nd_core::{JobId, StepId, StepKey, StepState};
use serde::{Deserialize, Serialize};

/// Persisted layout of one step-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEntry {
    pub uid: u32,
    pub job_id: JobId,
    pub step_id: StepId,
    pub ntasks: u32,
    pub timelimit: u64,
    pub exec_name: String,
    pub state: StepState,
    /// Interconnect switch allocation; always 0 on this node type
    pub sw_id: u32,
    pub io_update: bool,
}

impl StepEntry {
    /// A `Starting` entry for `key`.
    pub fn new(key: StepKey, uid: u32) -> Self {
        Self {
            uid,
            job_id: key.job_id,
            step_id: key.step_id,
            ntasks: 0,
            timelimit: 0,
            exec_name: String::new(),
            state: StepState::Starting,
            sw_id: 0,
            io_update: false,
        }
    }

    nd_core::setters! {
        into { exec_name: String }
        set { ntasks: u32, timelimit: u64, state: StepState }
    }

    pub fn key(&self) -> StepKey {
        StepKey::new(self.job_id, self.step_id)
    }
}
