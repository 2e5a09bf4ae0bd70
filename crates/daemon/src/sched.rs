// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler hook: the cluster priority subsystem as seen from this node.
//!
//! Owns one background migration task, supervised with a cancellation
//! token. Priority assignment is delegated to a [`PriorityAdapter`]; the
//! remaining scheduling callbacks are accepted and ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nd_adapters::{MigrationAdapter, PriorityAdapter, PriorityJob};
use nd_core::JobId;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const PLUGIN_NAME: &str = "Node-local migration scheduler";
pub const PLUGIN_TYPE: &str = "sched/migration";

#[derive(Debug, Error)]
pub enum HookError {
    #[error("migration task already running")]
    AlreadyRunning,
    #[error("no async runtime to host the migration task")]
    NoRuntime,
}

/// Settings the migration task reads at start and on reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedSettings {
    pub interval: Duration,
    pub disabled: bool,
}

impl SchedSettings {
    pub fn from_env() -> Self {
        Self { interval: crate::env::sched_interval(), disabled: crate::env::scheduling_disabled() }
    }
}

impl Default for SchedSettings {
    fn default() -> Self {
        Self { interval: Duration::from_secs(30), disabled: false }
    }
}

type SettingsLoader = Arc<dyn Fn() -> SchedSettings + Send + Sync>;

struct Background {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// The migration task slot. `Stopping` holds it until the old task has
/// been joined.
enum Slot {
    Idle,
    Running(Background),
    Stopping,
}

pub struct SchedPlugin<M, P> {
    migration: Arc<M>,
    priority: P,
    load: SettingsLoader,
    reload: Arc<AtomicBool>,
    background: Mutex<Slot>,
}

impl<M, P> SchedPlugin<M, P>
where
    M: MigrationAdapter,
    P: PriorityAdapter,
{
    pub fn new(
        migration: M,
        priority: P,
        load: impl Fn() -> SchedSettings + Send + Sync + 'static,
    ) -> Self {
        Self {
            migration: Arc::new(migration),
            priority,
            load: Arc::new(load),
            reload: Arc::new(AtomicBool::new(false)),
            background: Mutex::new(Slot::Idle),
        }
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn plugin_type(&self) -> &'static str {
        PLUGIN_TYPE
    }

    /// Start the migration task on the current tokio runtime.
    ///
    /// Succeeds without starting anything when scheduling is disabled.
    pub fn start(&self) -> Result<(), HookError> {
        let settings = (self.load)();
        if settings.disabled {
            info!("scheduling disabled, migration task not started");
            return Ok(());
        }

        let mut background = self.background.lock();
        if !matches!(*background, Slot::Idle) {
            debug!("migration task already running, not starting another");
            return Err(HookError::AlreadyRunning);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| HookError::NoRuntime)?;

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(migration_loop(
            Arc::clone(&self.migration),
            Arc::clone(&self.load),
            Arc::clone(&self.reload),
            settings,
            cancel.clone(),
        ));
        *background = Slot::Running(Background { cancel, handle });
        info!(interval_ms = settings.interval.as_millis() as u64, "migration scheduler loaded");
        Ok(())
    }

    /// Cancel the migration task and wait for it to finish.
    ///
    /// The slot stays taken until the task has been joined, so a `start`
    /// racing with `stop` gets [`HookError::AlreadyRunning`].
    pub async fn stop(&self) {
        let Background { cancel, handle } = {
            let mut slot = self.background.lock();
            match std::mem::replace(&mut *slot, Slot::Stopping) {
                Slot::Running(background) => background,
                other => {
                    *slot = other;
                    return;
                }
            }
        };
        info!("migration scheduler shutting down");
        cancel.cancel();
        if let Err(e) = handle.await {
            warn!(error = %e, "migration task ended abnormally");
        }
        *self.background.lock() = Slot::Idle;
    }

    /// True from a successful `start` until `stop` has joined the task.
    pub fn is_running(&self) -> bool {
        !matches!(*self.background.lock(), Slot::Idle)
    }

    /// Ask the migration task to re-read its settings before its next pass.
    pub fn reconfig(&self) {
        self.reload.store(true, Ordering::SeqCst);
    }

    pub fn initial_priority(&self, last: u32, job: &PriorityJob) -> u32 {
        self.priority.set(last, job)
    }

    pub fn schedule(&self) {}

    pub fn new_alloc(&self, _job: JobId) {}

    pub fn free_alloc(&self, _job: JobId) {}

    pub fn job_is_pending(&self) {}

    pub fn partition_change(&self) {}

    pub fn requeue(&self, _job: JobId, _reason: &str) {}

    /// Last plugin error; this hook never records one.
    pub fn errno(&self) -> i32 {
        0
    }

    pub fn strerror(&self, _errno: i32) -> Option<String> {
        None
    }

    pub fn conf(&self) -> Option<String> {
        None
    }
}

async fn migration_loop<M: MigrationAdapter>(
    migration: Arc<M>,
    load: SettingsLoader,
    reload: Arc<AtomicBool>,
    mut settings: SchedSettings,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(settings.interval) => {}
        }
        if reload.swap(false, Ordering::SeqCst) {
            settings = load();
            info!(interval_ms = settings.interval.as_millis() as u64, "migration settings reloaded");
        }
        if settings.disabled {
            continue;
        }
        let pass = tokio::select! {
            _ = cancel.cancelled() => break,
            pass = migration.run_pass() => pass,
        };
        match pass {
            Ok(0) => {}
            Ok(moved) => debug!(moved, "migration pass"),
            Err(e) => warn!(error = %e, "migration pass failed"),
        }
    }
}

#[cfg(test)]
#[path = "sched_tests.rs"]
mod tests;
