// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live job bookkeeping.
//!
//! The agent is the sole owner of every live [`JobRecord`]. Completing a
//! step removes it from the map, which is the only path to `destroy`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use nd_adapters::{SpawnError, TaskRunner};
use nd_core::{
    ClientEndpoint, EndpointId, IoObject, JobRecord, StepKey, StepState, TaskError, TaskState,
};
use nd_storage::{EntryGuard, StepTable, TableError};
use nd_wire::{BatchRequest, LaunchRequest};
use nix::sys::signal::Signal;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::create::{create_from_batch, create_from_launch, CreateDeps, CreateError};
use crate::kill::{kill_job, signal_tasks, KillReport, Sweep};
use crate::step::{describe, register_step, unregister_step};

/// Exit status recorded for a task whose process could not be started
pub const SPAWN_FAILED_STATUS: i32 = 127;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{0} is not running here")]
    UnknownStep(StepKey),
    #[error("{0} is already running here")]
    Duplicate(StepKey),
    #[error("{step} has no task {task}")]
    UnknownTask { step: StepKey, task: u32 },
    #[error(transparent)]
    Create(#[from] CreateError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Task(#[from] TaskError),
}

pub struct Agent<R, T> {
    deps: CreateDeps,
    runner: Arc<R>,
    table: Arc<T>,
    jobs: Mutex<HashMap<StepKey, Arc<JobRecord>>>,
}

impl<R, T> Agent<R, T>
where
    R: TaskRunner,
    T: StepTable,
{
    pub fn new(deps: CreateDeps, runner: Arc<R>, table: Arc<T>) -> Self {
        Self { deps, runner, table, jobs: Mutex::new(HashMap::new()) }
    }

    /// Create and register an interactive step.
    pub fn launch(
        &self,
        req: &LaunchRequest,
        client: SocketAddr,
    ) -> Result<Arc<JobRecord>, AgentError> {
        let job = create_from_launch(req, client, &self.deps)?;
        self.adopt(job)
    }

    /// Create and register a batch job. Its script path goes in with
    /// [`JobRecord::set_arg`] before [`Agent::start_tasks`].
    pub fn launch_batch(&self, req: &BatchRequest) -> Result<Arc<JobRecord>, AgentError> {
        let job = create_from_batch(req, &self.deps)?;
        self.adopt(job)
    }

    fn adopt(&self, job: JobRecord) -> Result<Arc<JobRecord>, AgentError> {
        let key = job.key();
        let mut jobs = self.jobs.lock();
        if jobs.contains_key(&key) {
            drop(jobs);
            job.destroy();
            return Err(AgentError::Duplicate(key));
        }
        if let Err(e) = register_step(&job, self.table.as_ref()) {
            debug!(job = %key, error = %e, "continuing without a step table entry");
        }
        let job = Arc::new(job);
        jobs.insert(key, Arc::clone(&job));
        info!(tasks = job.ntasks, "{} created", describe(key));
        Ok(job)
    }

    pub fn job(&self, key: StepKey) -> Option<Arc<JobRecord>> {
        self.jobs.lock().get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    fn get(&self, key: StepKey) -> Result<Arc<JobRecord>, AgentError> {
        self.job(key).ok_or(AgentError::UnknownStep(key))
    }

    /// Spawn every task and publish the step as `Running`.
    ///
    /// The table entry stays locked from the exec-name refresh to the
    /// `Running` publication, so a kill either lands before (and the step
    /// never starts) or after (and sees every pid). A step already `Ending`
    /// has its tasks marked killed instead. A task that fails to spawn is
    /// recorded as exited with [`SPAWN_FAILED_STATUS`]; the others still
    /// start. Returns how many started.
    pub fn start_tasks(&self, key: StepKey) -> Result<usize, AgentError> {
        let job = self.get(key)?;
        let mut guard = self.lock_or_register(&job);

        if let Some(guard) = guard.as_mut() {
            if guard.state() >= StepState::Ending {
                for task in job.tasks() {
                    task.mark_killed()?;
                }
                info!("{} killed before start, not spawning", describe(key));
                return Ok(0);
            }
            // a batch script may have been attached since registration
            if let Err(e) = guard.set_exec_name(&job.exec_name()) {
                warn!(job = %key, error = %e, "could not refresh exec name");
            }
        }

        let mut started = 0;
        for task in job.tasks() {
            task.mark_starting()?;
            match self.spawn_confirmed(&job, task) {
                Ok(pid) => {
                    task.mark_running(pid)?;
                    started += 1;
                }
                Err(e) => {
                    warn!(job = %key, task = task.id(), error = %e, "task failed to start");
                    task.mark_exited(SPAWN_FAILED_STATUS)?;
                }
            }
        }

        if let Some(mut guard) = guard {
            if guard.state() == StepState::Starting {
                if let Err(e) = guard.set_state(StepState::Running) {
                    warn!(job = %key, error = %e, "could not publish running state");
                }
            }
        }
        info!(started, "{} running", describe(key));
        Ok(started)
    }

    /// Lock the step's entry, registering it first if an earlier insert
    /// failed. `None` when the table stays unusable.
    fn lock_or_register(&self, job: &JobRecord) -> Option<Box<dyn EntryGuard + '_>> {
        let key = job.key();
        match self.table.lock_entry(key) {
            Ok(Some(guard)) => return Some(guard),
            Ok(None) => {}
            Err(e) => {
                warn!(job = %key, error = %e, "step table unavailable");
                return None;
            }
        }
        if let Err(e) = register_step(job, self.table.as_ref()) {
            debug!(job = %key, error = %e, "starting without a step table entry");
            return None;
        }
        self.table.lock_entry(key).unwrap_or_else(|e| {
            warn!(job = %key, error = %e, "step table unavailable");
            None
        })
    }

    /// Spawn one task and wait for the runner's handoff confirmation.
    fn spawn_confirmed(&self, job: &JobRecord, task: &TaskState) -> Result<u32, SpawnError> {
        let pid = self.runner.spawn(job, task)?;
        job.handoff().wait_ready().map_err(SpawnError::Handoff)?;
        Ok(pid)
    }

    /// Attach another client to an interactive step: every task streams to it.
    pub fn attach_client(
        &self,
        key: StepKey,
        endpoint: ClientEndpoint,
    ) -> Result<EndpointId, AgentError> {
        let job = self.get(key)?;
        let id = job.attach_client(endpoint);
        for task in job.tasks() {
            task.attach_endpoint(id);
        }
        job.attach_io(IoObject::client(id));
        debug!(job = %key, endpoint = id.0, "client attached");
        Ok(id)
    }

    /// Record a task's exit. Returns true once every task is done.
    pub fn task_exited(&self, key: StepKey, task: u32, status: i32) -> Result<bool, AgentError> {
        let job = self.get(key)?;
        let state = job.task(task).ok_or(AgentError::UnknownTask { step: key, task })?;
        state.mark_exited(status)?;
        debug!(job = %key, task, status, "task exited");
        Ok(is_done(&job))
    }

    /// Collect exits from the runner; returns the steps whose tasks are all done.
    pub fn poll_exits(&self) -> Vec<StepKey> {
        let jobs: Vec<_> = self.jobs.lock().values().cloned().collect();
        let mut finished = Vec::new();
        for job in jobs {
            for task in job.tasks() {
                let pid = {
                    let inner = task.lock();
                    match (inner.pid, inner.exit_status) {
                        (Some(pid), None) => pid,
                        _ => continue,
                    }
                };
                match self.runner.try_wait(pid) {
                    Ok(Some(status)) => {
                        if let Err(e) = task.mark_exited(status) {
                            warn!(job = %job.key(), task = task.id(), error = %e, "unexpected exit");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(job = %job.key(), task = task.id(), error = %e, "wait failed"),
                }
            }
            if is_done(&job) {
                finished.push(job.key());
            }
        }
        finished
    }

    /// Forward a signal to every live task of a step.
    pub fn signal(&self, key: StepKey, signal: Signal) -> Result<Sweep, AgentError> {
        let job = self.get(key)?;
        Ok(signal_tasks(job.as_ref(), self.runner.as_ref(), signal))
    }

    pub fn kill(&self, key: StepKey, signal: Signal) -> Result<KillReport, AgentError> {
        let job = self.get(key)?;
        Ok(kill_job(job.as_ref(), self.table.as_ref(), self.runner.as_ref(), signal)?)
    }

    /// Retire a step: publish `Complete`, drop its table entry and destroy
    /// the record.
    pub fn complete(&self, key: StepKey) -> Result<(), AgentError> {
        let job = self.jobs.lock().remove(&key).ok_or(AgentError::UnknownStep(key))?;

        match self.table.lock_entry(key) {
            Ok(Some(mut guard)) => {
                if let Err(e) = guard.set_state(StepState::Complete) {
                    warn!(job = %key, error = %e, "could not publish complete state");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(job = %key, error = %e, "step table unavailable"),
        }
        if let Err(e) = unregister_step(key, self.table.as_ref()) {
            debug!(job = %key, error = %e, "step table entry already gone");
        }

        match Arc::try_unwrap(job) {
            Ok(job) => job.destroy(),
            // the last outside holder drops the record
            Err(job) => {
                warn!(job = %key, holders = Arc::strong_count(&job) - 1, "record still shared at completion");
            }
        }
        info!("{} complete", describe(key));
        Ok(())
    }

    /// Kill and retire every step.
    pub fn shutdown(&self) {
        let keys: Vec<_> = self.jobs.lock().keys().copied().collect();
        for key in keys {
            if let Err(e) = self.kill(key, Signal::SIGKILL) {
                warn!(job = %key, error = %e, "kill during shutdown failed");
            }
            if let Err(e) = self.complete(key) {
                warn!(job = %key, error = %e, "completion during shutdown failed");
            }
        }
    }
}

/// Every task has finished and every started process has been reaped.
fn is_done(job: &JobRecord) -> bool {
    job.tasks().iter().all(|task| {
        let inner = task.lock();
        inner.status.is_terminal() && (inner.pid.is_none() || inner.exit_status.is_some())
    })
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
