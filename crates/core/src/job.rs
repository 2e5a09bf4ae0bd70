// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record: the aggregate for one step or one batch job.

use crate::endpoint::{ClientEndpoint, EndpointId};
use crate::handoff::HandoffPipe;
use crate::id::{JobId, StepId, StepKey};
use crate::identity::UserIdentity;
use crate::io::IoObject;
use crate::task::TaskState;
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;

/// Staging area for a [`JobRecord`].
///
/// Every fallible step of job creation happens while the parts sit here;
/// dropping the builder releases all of them. Only [`JobBuilder::build`],
/// which needs the already-opened handoff pipe, produces a record.
#[derive(Debug)]
pub struct JobBuilder {
    job_id: JobId,
    step_id: StepId,
    user: UserIdentity,
    nprocs: u32,
    nnodes: u32,
    node_id: u32,
    ntasks: u32,
    task_flags: u16,
    debug: u16,
    timelimit: u64,
    env: Vec<String>,
    argv: Vec<String>,
    cwd: PathBuf,
    batch: bool,
    endpoint: ClientEndpoint,
    tasks: Vec<TaskState>,
}

impl JobBuilder {
    /// Start a job owned by `user`, with `endpoint` as its first client.
    pub fn new(key: StepKey, user: UserIdentity, endpoint: ClientEndpoint) -> Self {
        Self {
            job_id: key.job_id,
            step_id: key.step_id,
            user,
            nprocs: 1,
            nnodes: 1,
            node_id: 0,
            ntasks: 1,
            task_flags: 0,
            debug: 0,
            timelimit: 0,
            env: Vec::new(),
            argv: Vec::new(),
            cwd: PathBuf::from("/"),
            batch: false,
            endpoint,
            tasks: Vec::new(),
        }
    }

    crate::setters! {
        into {
            cwd: PathBuf,
        }
        set {
            nprocs: u32,
            nnodes: u32,
            node_id: u32,
            ntasks: u32,
            task_flags: u16,
            debug: u16,
            timelimit: u64,
            batch: bool,
        }
    }

    /// Copy the environment; the record never borrows the request.
    pub fn env(mut self, env: &[String]) -> Self {
        self.env = env.to_vec();
        self
    }

    /// Copy the argument vector.
    pub fn argv(mut self, argv: &[String]) -> Self {
        self.argv = argv.to_vec();
        self
    }

    /// Reserve `slots` empty arguments, to be filled in once the batch
    /// script has been written out.
    pub fn argv_slots(mut self, slots: usize) -> Self {
        self.argv = vec![String::new(); slots];
        self
    }

    /// Create one task per local index. Task `i` gets global id
    /// `global_ids[i]`, or `i` when the list is short.
    pub fn init_tasks(mut self, global_ids: &[u32]) -> Self {
        self.tasks = (0..self.ntasks)
            .map(|i| {
                let gid = global_ids.get(i as usize).copied().unwrap_or(i);
                TaskState::new(i, gid)
            })
            .collect();
        self
    }

    pub fn key(&self) -> StepKey {
        StepKey { job_id: self.job_id, step_id: self.step_id }
    }

    /// Seal the record. Tasks are published only now, fully initialised.
    pub fn build(self, handoff: HandoffPipe) -> JobRecord {
        let tasks = if self.tasks.is_empty() {
            (0..self.ntasks).map(|i| TaskState::new(i, i)).collect()
        } else {
            self.tasks
        };
        JobRecord {
            job_id: self.job_id,
            step_id: self.step_id,
            user: self.user,
            nprocs: self.nprocs,
            nnodes: self.nnodes,
            node_id: self.node_id,
            ntasks: self.ntasks,
            task_flags: self.task_flags,
            debug: self.debug,
            timelimit: self.timelimit,
            env: self.env,
            argv: RwLock::new(self.argv),
            cwd: self.cwd,
            batch: self.batch,
            tasks: tasks.into_iter().map(Arc::new).collect(),
            endpoints: RwLock::new(vec![self.endpoint]),
            io_objects: Mutex::new(Vec::new()),
            handoff,
        }
    }
}

/// One job step (or batch job) running on this node.
///
/// Owns its tasks, client endpoints and I/O objects. Tasks refer to
/// endpoints by [`EndpointId`]; the endpoint list is append-only so ids stay
/// valid for the life of the record.
#[derive(Debug)]
pub struct JobRecord {
    pub job_id: JobId,
    pub step_id: StepId,
    pub user: UserIdentity,
    pub nprocs: u32,
    pub nnodes: u32,
    /// This node's index within the step
    pub node_id: u32,
    /// Tasks launched on this node
    pub ntasks: u32,
    pub task_flags: u16,
    pub debug: u16,
    /// Credential expiration, seconds since the epoch
    pub timelimit: u64,
    pub env: Vec<String>,
    argv: RwLock<Vec<String>>,
    pub cwd: PathBuf,
    pub batch: bool,
    tasks: Vec<Arc<TaskState>>,
    endpoints: RwLock<Vec<ClientEndpoint>>,
    io_objects: Mutex<Vec<IoObject>>,
    handoff: HandoffPipe,
}

impl JobRecord {
    pub fn key(&self) -> StepKey {
        StepKey { job_id: self.job_id, step_id: self.step_id }
    }

    pub fn tasks(&self) -> &[Arc<TaskState>] {
        &self.tasks
    }

    pub fn task(&self, id: u32) -> Option<&Arc<TaskState>> {
        self.tasks.get(id as usize)
    }

    pub fn argv(&self) -> Vec<String> {
        self.argv.read().clone()
    }

    /// Executable name as published in the step table: `argv[0]`, or empty
    /// while a batch script has not been written yet.
    pub fn exec_name(&self) -> String {
        self.argv.read().first().cloned().unwrap_or_default()
    }

    /// Fill argument slot `index` (batch jobs attach their script path late).
    /// Grows the vector if needed.
    pub fn set_arg(&self, index: usize, value: impl Into<String>) {
        let mut argv = self.argv.write();
        if argv.len() <= index {
            argv.resize(index + 1, String::new());
        }
        argv[index] = value.into();
    }

    /// Add a client endpoint (a new I/O connection to an interactive step).
    pub fn attach_client(&self, endpoint: ClientEndpoint) -> EndpointId {
        let mut endpoints = self.endpoints.write();
        endpoints.push(endpoint);
        EndpointId(endpoints.len() - 1)
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<ClientEndpoint> {
        self.endpoints.read().get(id.0).cloned()
    }

    /// The client that created the job.
    pub fn primary_endpoint(&self) -> ClientEndpoint {
        // The list is never empty: build() seeds it and nothing removes.
        self.endpoints.read()[0].clone()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.read().len()
    }

    pub fn attach_io(&self, object: IoObject) {
        self.io_objects.lock().push(object);
    }

    pub fn io_objects(&self) -> Vec<IoObject> {
        self.io_objects.lock().clone()
    }

    pub fn handoff(&self) -> &HandoffPipe {
        &self.handoff
    }

    /// Tear the record down: every task releases its subscriber list, then
    /// the endpoint list, I/O objects, vectors, identity and handoff pipe go
    /// with `self`.
    ///
    /// Consumes the record, so it can run at most once per job.
    pub fn destroy(self) {
        for task in &self.tasks {
            task.destroy();
        }
        self.endpoints.write().clear();
        self.io_objects.lock().clear();
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
