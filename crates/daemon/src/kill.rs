// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal propagation to a job's tasks.

use nd_adapters::{SignalError, TaskRunner};
use nd_core::{JobRecord, StepState, TaskStatus};
use nd_storage::{StepTable, TableError};
use nix::sys::signal::Signal;
use tracing::{debug, error, warn};

use crate::step::describe;

/// Outcome of signalling every live task of a job.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sweep {
    /// Local ids of tasks the signal reached
    pub delivered: Vec<u32>,
    /// Tasks whose process had already gone
    pub gone: Vec<u32>,
    pub failed: Vec<(u32, SignalError)>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KillReport {
    /// Whether the step had a table entry at all
    pub found: bool,
    pub sweep: Sweep,
}

/// Forward `signal` to every task with a live process. No state changes.
///
/// A missing process is not an error; other failures are logged and the
/// sweep continues.
pub fn signal_tasks<R: TaskRunner + ?Sized>(job: &JobRecord, runner: &R, signal: Signal) -> Sweep {
    let mut sweep = Sweep::default();
    for task in job.tasks() {
        let pid = {
            let inner = task.lock();
            match (inner.status, inner.pid) {
                (TaskStatus::Exited, _) | (_, None) => continue,
                (_, Some(pid)) => pid,
            }
        };
        match runner.signal(pid, signal) {
            Ok(()) => sweep.delivered.push(task.id()),
            Err(SignalError::NotFound) => {
                debug!(job = %job.key(), task = task.id(), pid, "task already gone");
                sweep.gone.push(task.id());
            }
            Err(e) => {
                error!(job = %job.key(), task = task.id(), pid, error = %e, "signal delivery failed");
                sweep.failed.push((task.id(), e));
            }
        }
    }
    sweep
}

/// Kill a job: signal its tasks and move its table entry to `Ending`.
///
/// The entry stays locked for the whole sweep. Without an entry this is a
/// successful no-op. Tasks are only signalled once the step is past
/// `Starting`. The record itself is left alone; teardown belongs to the
/// owner.
pub fn kill_job<T, R>(
    job: &JobRecord,
    table: &T,
    runner: &R,
    signal: Signal,
) -> Result<KillReport, TableError>
where
    T: StepTable + ?Sized,
    R: TaskRunner + ?Sized,
{
    let key = job.key();
    let Some(mut guard) = table.lock_entry(key)? else {
        debug!("kill {}: no step table entry", describe(key));
        return Ok(KillReport::default());
    };

    let mut report = KillReport { found: true, sweep: Sweep::default() };
    if guard.state().has_tasks() {
        report.sweep = signal_tasks(job, runner, signal);
        for id in &report.sweep.delivered {
            if let Some(task) = job.task(*id) {
                // a task may have exited between signal and mark
                if let Err(e) = task.mark_killed() {
                    debug!(job = %key, error = %e, "task finished before it was marked killed");
                }
            }
        }
    }

    if guard.state() < StepState::Ending {
        if let Err(e) = guard.set_state(StepState::Ending) {
            warn!(job = %key, error = %e, "could not publish ending state");
        }
    }
    drop(guard);

    debug!(job = %key, %signal, delivered = report.sweep.delivered.len(), "kill sweep done");
    Ok(report)
}

#[cfg(test)]
#[path = "kill_tests.rs"]
mod tests;
