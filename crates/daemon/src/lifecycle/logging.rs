// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use super::{Config, LifecycleError};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "nd=info";

/// Route tracing output to the daemon log file.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the writer thread.
pub fn init_logging(config: &Config) -> Result<WorkerGuard, LifecycleError> {
    let dir = config.log_path.parent().unwrap_or(&config.state_dir);
    std::fs::create_dir_all(dir)?;
    let file_name = config.log_path.file_name().unwrap_or("ndd.log".as_ref());

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| LifecycleError::Logging(e.to_string()))?;
    Ok(guard)
}
