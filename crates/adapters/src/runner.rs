// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task runner: process creation and signal delivery.

use nd_core::{JobRecord, TaskState};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::{geteuid, Pid};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::File;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use thiserror::Error;

/// Why a signal could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// The process is gone (already exited and reaped)
    #[error("no such process")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("kill failed: {0}")]
    Other(Errno),
}

impl From<Errno> for SignalError {
    fn from(errno: Errno) -> Self {
        match errno {
            Errno::ESRCH => SignalError::NotFound,
            Errno::EPERM => SignalError::PermissionDenied,
            other => SignalError::Other(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("job has no executable")]
    NoExecutable,
    #[error("failed to open {path}: {source}")]
    Stdio { path: String, source: std::io::Error },
    #[error("exec failed: {0}")]
    Exec(#[source] std::io::Error),
    #[error("wait failed: {0}")]
    Wait(#[source] std::io::Error),
    #[error("startup handoff failed: {0}")]
    Handoff(#[source] std::io::Error),
}

/// Starts task processes and delivers signals to them.
pub trait TaskRunner: Send + Sync + 'static {
    /// Start the process for `task` and return its pid.
    ///
    /// Once the process exists the runner confirms it with one
    /// [`HandoffPipe::notify_ready`](nd_core::HandoffPipe::notify_ready) on
    /// the job's pipe; an `Ok` pid always carries that confirmation.
    fn spawn(&self, job: &JobRecord, task: &TaskState) -> Result<u32, SpawnError>;

    /// Deliver `signal` to process `pid`.
    fn signal(&self, pid: u32, signal: Signal) -> Result<(), SignalError>;

    /// Exit status of `pid` if it has exited, reaping it.
    fn try_wait(&self, pid: u32) -> Result<Option<i32>, SpawnError>;
}

/// Runs tasks as local child processes.
///
/// Environment is replaced by the job's; uid/gid switch to the job owner
/// only when the agent runs as root.
#[derive(Clone, Default)]
pub struct ProcessRunner {
    children: Arc<Mutex<HashMap<u32, Child>>>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn command(job: &JobRecord, task: &TaskState) -> Result<Command, SpawnError> {
        let argv = job.argv();
        let program = argv.first().filter(|p| !p.is_empty()).ok_or(SpawnError::NoExecutable)?;

        let mut cmd = Command::new(program);
        cmd.args(argv.iter().skip(1)).env_clear().current_dir(&job.cwd);
        for entry in &job.env {
            if let Some((key, value)) = entry.split_once('=') {
                cmd.env(key, value);
            }
        }
        cmd.env("ND_JOBID", job.job_id.to_string())
            .env("ND_NPROCS", job.nprocs.to_string())
            .env("ND_NODEID", job.node_id.to_string())
            .env("ND_PROCID", task.global_id().to_string())
            .env("ND_LOCALID", task.id().to_string());
        if let Some(step) = job.step_id.get() {
            cmd.env("ND_STEPID", step.to_string());
        }

        let endpoint = job.primary_endpoint();
        let stdout = open_output(&job.cwd, endpoint.ofname.as_deref())?;
        let stderr = if endpoint.efname.is_some() && endpoint.efname == endpoint.ofname {
            match &stdout {
                Some(file) => Some(file.try_clone().map_err(SpawnError::Exec)?),
                None => None,
            }
        } else {
            open_output(&job.cwd, endpoint.efname.as_deref())?
        };
        let stdin = match endpoint.ifname.as_deref() {
            Some(path) => Some(File::open(job.cwd.join(path)).map_err(|source| {
                SpawnError::Stdio { path: path.display().to_string(), source }
            })?),
            None => None,
        };
        cmd.stdin(stdin.map_or_else(Stdio::null, Stdio::from));
        cmd.stdout(stdout.map_or_else(Stdio::null, Stdio::from));
        cmd.stderr(stderr.map_or_else(Stdio::null, Stdio::from));

        if geteuid().is_root() {
            cmd.uid(job.user.uid).gid(job.user.gid);
        }
        Ok(cmd)
    }
}

fn open_output(cwd: &Path, path: Option<&Path>) -> Result<Option<File>, SpawnError> {
    let Some(path) = path else {
        return Ok(None);
    };
    File::options()
        .create(true)
        .append(true)
        .open(cwd.join(path))
        .map(Some)
        .map_err(|source| SpawnError::Stdio { path: path.display().to_string(), source })
}

impl TaskRunner for ProcessRunner {
    fn spawn(&self, job: &JobRecord, task: &TaskState) -> Result<u32, SpawnError> {
        let mut child = Self::command(job, task)?.spawn().map_err(SpawnError::Exec)?;
        let pid = child.id();
        if let Err(e) = job.handoff().notify_ready() {
            if let Err(reap) = child.kill().and_then(|()| child.wait().map(drop)) {
                tracing::warn!(pid, error = %reap, "could not reap unconfirmed task");
            }
            return Err(SpawnError::Handoff(e));
        }
        tracing::debug!(job = %job.key(), task = task.id(), pid, "spawned task");
        self.children.lock().insert(pid, child);
        Ok(pid)
    }

    fn signal(&self, pid: u32, signal: Signal) -> Result<(), SignalError> {
        let raw = i32::try_from(pid).map_err(|_| SignalError::NotFound)?;
        kill(Pid::from_raw(raw), signal).map_err(SignalError::from)
    }

    fn try_wait(&self, pid: u32) -> Result<Option<i32>, SpawnError> {
        let mut children = self.children.lock();
        let Some(child) = children.get_mut(&pid) else {
            return Ok(None);
        };
        let Some(status) = child.try_wait().map_err(SpawnError::Wait)? else {
            return Ok(None);
        };
        children.remove(&pid);
        Ok(Some(status.code().unwrap_or_else(|| 128 + status.signal().unwrap_or(0))))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{SignalError, SpawnError, TaskRunner};
    use nd_core::{JobRecord, TaskState};
    use nix::sys::signal::Signal;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    /// Recorded signal delivery
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SignalCall {
        pub pid: u32,
        pub signal: Signal,
    }

    struct FakeRunnerState {
        next_pid: u32,
        spawned: Vec<(u32, u32)>,
        signals: Vec<SignalCall>,
        gone: HashSet<u32>,
        denied: HashSet<u32>,
        exits: HashMap<u32, i32>,
        fail_spawn: bool,
    }

    /// Fake task runner: hands out pids, records signals, and lets tests
    /// script which pids are gone or exited.
    #[derive(Clone)]
    pub struct FakeTaskRunner {
        inner: Arc<Mutex<FakeRunnerState>>,
    }

    impl Default for FakeTaskRunner {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeRunnerState {
                    next_pid: 1000,
                    spawned: Vec::new(),
                    signals: Vec::new(),
                    gone: HashSet::new(),
                    denied: HashSet::new(),
                    exits: HashMap::new(),
                    fail_spawn: false,
                })),
            }
        }
    }

    impl FakeTaskRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Signals to `pid` fail with `NotFound`.
        pub fn set_gone(&self, pid: u32) {
            self.inner.lock().gone.insert(pid);
        }

        /// Signals to `pid` fail with `PermissionDenied`.
        pub fn set_denied(&self, pid: u32) {
            self.inner.lock().denied.insert(pid);
        }

        /// `try_wait(pid)` reports `status` from now on.
        pub fn set_exited(&self, pid: u32, status: i32) {
            self.inner.lock().exits.insert(pid, status);
        }

        pub fn set_fail_spawn(&self, fail: bool) {
            self.inner.lock().fail_spawn = fail;
        }

        /// `(task id, pid)` for each spawn, in order
        pub fn spawned(&self) -> Vec<(u32, u32)> {
            self.inner.lock().spawned.clone()
        }

        /// Successfully delivered signals
        pub fn signals(&self) -> Vec<SignalCall> {
            self.inner.lock().signals.clone()
        }
    }

    impl TaskRunner for FakeTaskRunner {
        fn spawn(&self, job: &JobRecord, task: &TaskState) -> Result<u32, SpawnError> {
            let mut inner = self.inner.lock();
            if inner.fail_spawn {
                return Err(SpawnError::Exec(std::io::Error::other("spawn disabled")));
            }
            job.handoff().notify_ready().map_err(SpawnError::Handoff)?;
            let pid = inner.next_pid;
            inner.next_pid += 1;
            inner.spawned.push((task.id(), pid));
            Ok(pid)
        }

        fn signal(&self, pid: u32, signal: Signal) -> Result<(), SignalError> {
            let mut inner = self.inner.lock();
            if inner.gone.contains(&pid) {
                return Err(SignalError::NotFound);
            }
            if inner.denied.contains(&pid) {
                return Err(SignalError::PermissionDenied);
            }
            inner.signals.push(SignalCall { pid, signal });
            Ok(())
        }

        fn try_wait(&self, pid: u32) -> Result<Option<i32>, SpawnError> {
            Ok(self.inner.lock().exits.remove(&pid))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTaskRunner, SignalCall};

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
