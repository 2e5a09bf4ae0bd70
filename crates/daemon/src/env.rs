// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Default output pattern for batch jobs that name none
pub const DEFAULT_BATCH_OUTPUT: &str = "job-%j.out";

/// Resolve state directory: ND_STATE_DIR > XDG_STATE_HOME/nd > ~/.local/state/nd
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("ND_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("nd"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/nd"))
}

/// Pause between migration passes (default 30s)
pub fn sched_interval() -> Duration {
    std::env::var("ND_SCHED_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// `ND_SCHEDULING_DISABLED=1` (or `true`) keeps the scheduler hook idle.
pub fn scheduling_disabled() -> bool {
    std::env::var("ND_SCHEDULING_DISABLED")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Output pattern for batch jobs without an explicit one.
pub fn batch_output() -> String {
    std::env::var("ND_BATCH_OUTPUT")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BATCH_OUTPUT.to_string())
}
