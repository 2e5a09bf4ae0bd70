// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ndd`: the node-local step agent daemon.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use nd_adapters::{BasicPriority, NoopMigration, ProcessRunner};
use nd_daemon::lifecycle::{init_logging, startup};
use nd_daemon::{Agent, Config, CreateDeps, LifecycleError, SchedPlugin, SchedSettings};
use tracing::{error, info, warn};

/// How often finished tasks are reaped
const REAP_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ndd: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), LifecycleError> {
    let config = Config::load()?;
    let _log_guard = init_logging(&config)?;
    let daemon = startup(&config)?;

    let deps = CreateDeps::system().batch_output(config.batch_output.clone());
    let agent = Agent::new(deps, Arc::new(ProcessRunner::new()), Arc::clone(&daemon.table));

    let sched = SchedPlugin::new(NoopMigration, BasicPriority, SchedSettings::from_env);
    if let Err(e) = sched.start() {
        // reported once; the agent runs without it
        error!(error = %e, "scheduler hook failed to start");
    }

    let mut reap = tokio::time::interval(REAP_INTERVAL);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = reap.tick() => {
                for key in agent.poll_exits() {
                    if let Err(e) = agent.complete(key) {
                        warn!(job = %key, error = %e, "completion failed");
                    }
                }
            }
        }
    }

    info!("shutting down");
    sched.stop().await;
    agent.shutdown();
    Ok(())
}
