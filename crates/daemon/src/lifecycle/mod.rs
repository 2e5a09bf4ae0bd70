// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: configuration, logging, startup.

mod logging;
mod startup;

pub use logging::init_logging;
pub use startup::{startup, DaemonState};

use std::path::PathBuf;

use thiserror::Error;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/nd)
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Directory backing the shared step table
    pub steps_path: PathBuf,
    /// Output pattern for batch jobs that name none
    pub batch_output: String,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::under(crate::env::state_dir()?))
    }

    /// Configuration rooted at `state_dir`, other settings from the environment.
    pub fn under(state_dir: PathBuf) -> Self {
        Self {
            lock_path: state_dir.join("ndd.pid"),
            log_path: state_dir.join("ndd.log"),
            steps_path: state_dir.join("steps"),
            batch_output: crate::env::batch_output(),
            state_dir,
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Step table error: {0}")]
    Table(#[from] nd_storage::TableError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
