// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use fs2::FileExt;
use nd_storage::{FileStepTable, StepTable};
use tracing::{info, warn};

use super::{Config, LifecycleError};

/// Resources held while the daemon runs.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub table: Arc<FileStepTable>,
}

/// Take the daemon lock and open the step table.
///
/// Entries left behind by a previous run describe steps nobody owns any
/// more; they are removed.
pub fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file (truncate now that we hold the lock)
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let table = FileStepTable::open(&config.steps_path)?;
    let stale = table.keys()?;
    for key in &stale {
        if let Err(e) = table.delete(*key) {
            warn!(job = %key, error = %e, "could not remove stale step entry");
        }
    }
    if !stale.is_empty() {
        info!(count = stale.len(), "removed stale step table entries");
    }

    info!(state_dir = %config.state_dir.display(), "daemon started");
    Ok(DaemonState { config: config.clone(), lock_file, table: Arc::new(table) })
}
