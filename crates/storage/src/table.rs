// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::StepEntry;
use nd_core::{StepKey, StepState};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("step table io: {0}")]
    Io(#[from] std::io::Error),
    #[error("step table codec: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("no step table entry for {0}")]
    NotFound(StepKey),
}

/// Exclusive hold on one table entry. The key unlocks when the guard drops.
pub trait EntryGuard {
    fn entry(&self) -> &StepEntry;

    fn state(&self) -> StepState {
        self.entry().state
    }

    /// Update the state; file-backed tables write it through before returning.
    fn set_state(&mut self, state: StepState) -> Result<(), TableError>;

    /// Replace the recorded executable name, leaving the state alone.
    fn set_exec_name(&mut self, exec_name: &str) -> Result<(), TableError>;
}

/// Keyed store of [`StepEntry`] values with one lock per key.
pub trait StepTable: Send + Sync + 'static {
    /// Add or replace the entry for `entry.key()`.
    fn insert(&self, entry: StepEntry) -> Result<(), TableError>;

    /// Block until `key` is exclusively held. `None` when there is no entry.
    fn lock_entry(&self, key: StepKey) -> Result<Option<Box<dyn EntryGuard + '_>>, TableError>;

    /// Remove the entry; `NotFound` when there was none.
    fn delete(&self, key: StepKey) -> Result<(), TableError>;

    /// Keys currently present, in no particular order.
    fn keys(&self) -> Result<Vec<StepKey>, TableError>;
}
