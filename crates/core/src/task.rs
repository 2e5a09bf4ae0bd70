// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-task execution record and its state machine.

use crate::endpoint::EndpointId;
use parking_lot::{Mutex, MutexGuard};
use std::os::fd::OwnedFd;
use thiserror::Error;

/// Lifecycle of one task.
///
/// ```text
/// Init -> Starting -> Running -> Exited
///    \        \          \
///     `--------`----------`----> Killed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Init,
    Starting,
    Running,
    Exited,
    Killed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Exited | TaskStatus::Killed)
    }
}

crate::simple_display! {
    TaskStatus {
        Init => "init",
        Starting => "starting",
        Running => "running",
        Exited => "exited",
        Killed => "killed",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task {task}: invalid transition {from} -> {to}")]
    InvalidTransition { task: u32, from: TaskStatus, to: TaskStatus },
}

/// Read and write ends of one stdio pipe. Both start closed.
#[derive(Debug, Default)]
pub struct PipePair {
    pub read: Option<OwnedFd>,
    pub write: Option<OwnedFd>,
}

impl PipePair {
    pub fn is_open(&self) -> bool {
        self.read.is_some() || self.write.is_some()
    }

    /// Close both ends.
    pub fn close(&mut self) {
        self.read = None;
        self.write = None;
    }
}

/// Fields guarded by a task's private lock.
#[derive(Debug)]
pub struct TaskInner {
    pub status: TaskStatus,
    pub pid: Option<u32>,
    pub stdin: PipePair,
    pub stdout: PipePair,
    pub stderr: PipePair,
    pub exit_status: Option<i32>,
    subscribers: Vec<EndpointId>,
}

impl TaskInner {
    pub fn subscribers(&self) -> &[EndpointId] {
        &self.subscribers
    }
}

/// Consistent copy of a task's guarded fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub id: u32,
    pub global_id: u32,
    pub status: TaskStatus,
    pub pid: Option<u32>,
    pub exit_status: Option<i32>,
    pub subscribers: Vec<EndpointId>,
}

/// One task of a step.
///
/// Identity is immutable; everything else lives behind the private lock, so
/// a reader holding the lock always sees a consistent state.
#[derive(Debug)]
pub struct TaskState {
    id: u32,
    global_id: u32,
    inner: Mutex<TaskInner>,
}

impl TaskState {
    /// A task in `Init` with no process and all pipes closed.
    pub fn new(id: u32, global_id: u32) -> Self {
        Self {
            id,
            global_id,
            inner: Mutex::new(TaskInner {
                status: TaskStatus::Init,
                pid: None,
                stdin: PipePair::default(),
                stdout: PipePair::default(),
                stderr: PipePair::default(),
                exit_status: None,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Local task index within the step.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Task index across the whole step (all nodes).
    pub fn global_id(&self) -> u32 {
        self.global_id
    }

    /// Acquire the private lock.
    pub fn lock(&self) -> MutexGuard<'_, TaskInner> {
        self.inner.lock()
    }

    pub fn status(&self) -> TaskStatus {
        self.inner.lock().status
    }

    pub fn pid(&self) -> Option<u32> {
        self.inner.lock().pid
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let inner = self.inner.lock();
        TaskSnapshot {
            id: self.id,
            global_id: self.global_id,
            status: inner.status,
            pid: inner.pid,
            exit_status: inner.exit_status,
            subscribers: inner.subscribers.clone(),
        }
    }

    /// Subscribe a client endpoint to this task's I/O.
    pub fn attach_endpoint(&self, endpoint: EndpointId) {
        self.inner.lock().subscribers.push(endpoint);
    }

    pub fn mark_starting(&self) -> Result<(), TaskError> {
        self.transition(TaskStatus::Starting, |inner| inner.status == TaskStatus::Init)
    }

    /// Record the process id reported by the task runner.
    pub fn mark_running(&self, pid: u32) -> Result<(), TaskError> {
        let mut inner = self.inner.lock();
        if inner.status != TaskStatus::Starting {
            return Err(self.invalid(inner.status, TaskStatus::Running));
        }
        inner.status = TaskStatus::Running;
        inner.pid = Some(pid);
        Ok(())
    }

    /// Record process exit. A killed task keeps its `Killed` status but
    /// still records the exit status.
    pub fn mark_exited(&self, status: i32) -> Result<(), TaskError> {
        let mut inner = self.inner.lock();
        match inner.status {
            TaskStatus::Starting | TaskStatus::Running => inner.status = TaskStatus::Exited,
            TaskStatus::Killed => {}
            from => return Err(self.invalid(from, TaskStatus::Exited)),
        }
        inner.exit_status = Some(status);
        Ok(())
    }

    pub fn mark_killed(&self) -> Result<(), TaskError> {
        self.transition(TaskStatus::Killed, |inner| !inner.status.is_terminal())
    }

    /// Release the subscriber references and close any open pipe ends.
    ///
    /// Endpoints themselves are owned by the job and are not touched.
    pub fn destroy(&self) {
        let mut inner = self.inner.lock();
        inner.subscribers.clear();
        inner.stdin.close();
        inner.stdout.close();
        inner.stderr.close();
    }

    fn transition(
        &self,
        to: TaskStatus,
        allowed: impl FnOnce(&TaskInner) -> bool,
    ) -> Result<(), TaskError> {
        let mut inner = self.inner.lock();
        if !allowed(&inner) {
            return Err(self.invalid(inner.status, to));
        }
        inner.status = to;
        Ok(())
    }

    fn invalid(&self, from: TaskStatus, to: TaskStatus) -> TaskError {
        TaskError::InvalidTransition { task: self.id, from, to }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
