// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster-visible coarse step state.

use serde::{Deserialize, Serialize};

/// Coarse lifecycle of a step as published in the shared step table.
///
/// Variants are ordered: comparisons like `state > StepState::Starting`
/// mean "tasks may already exist".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// Entry registered, no task spawned yet
    Starting,
    /// Tasks are being or have been spawned
    Running,
    /// Kill requested; tasks are being torn down
    Ending,
    /// All tasks reaped; entry about to be removed
    Complete,
}

impl StepState {
    /// Whether tasks of this step may hold live processes.
    pub fn has_tasks(self) -> bool {
        self > StepState::Starting
    }

    pub fn is_ending(self) -> bool {
        matches!(self, StepState::Ending | StepState::Complete)
    }
}

crate::simple_display! {
    StepState {
        Starting => "starting",
        Running => "running",
        Ending => "ending",
        Complete => "complete",
    }
}
