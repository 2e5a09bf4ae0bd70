// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{OsPipes, PipeAdapter};
use nd_core::{AuthKey, ClientEndpoint, HandoffPipe, JobBuilder, StepKey, UserIdentity};
use std::time::{Duration, Instant};

fn job(argv: &[&str], cwd: &Path, endpoint: ClientEndpoint) -> JobRecord {
    job_with_pipe(argv, cwd, endpoint, OsPipes.open().unwrap())
}

fn job_with_pipe(argv: &[&str], cwd: &Path, endpoint: ClientEndpoint, pipe: HandoffPipe) -> JobRecord {
    let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
    let uid = geteuid().as_raw();
    JobBuilder::new(StepKey::new(5, 0), UserIdentity::new("me", uid, 0), endpoint)
        .argv(&argv)
        .env(&["GREETING=hi".to_string()])
        .cwd(cwd)
        .init_tasks(&[])
        .build(pipe)
}

fn wait_for_exit(runner: &ProcessRunner, pid: u32) -> i32 {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(status) = runner.try_wait(pid).unwrap() {
            return status;
        }
        assert!(Instant::now() < deadline, "process {pid} did not exit");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[yare::parameterized(
    esrch = { Errno::ESRCH, SignalError::NotFound },
    eperm = { Errno::EPERM, SignalError::PermissionDenied },
    einval = { Errno::EINVAL, SignalError::Other(Errno::EINVAL) },
)]
fn errno_maps_to_signal_error(errno: Errno, expected: SignalError) {
    assert_eq!(SignalError::from(errno), expected);
}

#[test]
fn process_runner_reports_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = ClientEndpoint::new(AuthKey::default(), None, None);
    let job = job(&["/bin/sh", "-c", "exit 3"], dir.path(), endpoint);
    let runner = ProcessRunner::new();

    let pid = runner.spawn(&job, &job.tasks()[0]).unwrap();
    assert_eq!(wait_for_exit(&runner, pid), 3);
    // reaped: further waits see nothing
    assert_eq!(runner.try_wait(pid).unwrap(), None);
}

#[test]
fn process_runner_writes_output_override_with_job_env() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = ClientEndpoint::new(AuthKey::default(), None, None)
        .ofname("out.log")
        .efname("out.log");
    let job = job(&["/bin/sh", "-c", "echo $GREETING $ND_JOBID $ND_PROCID"], dir.path(), endpoint);
    let runner = ProcessRunner::new();

    let pid = runner.spawn(&job, &job.tasks()[0]).unwrap();
    assert_eq!(wait_for_exit(&runner, pid), 0);

    let out = std::fs::read_to_string(dir.path().join("out.log")).unwrap();
    assert_eq!(out.trim(), "hi 5 0");
}

#[test]
fn process_runner_signal_kills_task() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = ClientEndpoint::new(AuthKey::default(), None, None);
    let job = job(&["/bin/sleep", "30"], dir.path(), endpoint);
    let runner = ProcessRunner::new();

    let pid = runner.spawn(&job, &job.tasks()[0]).unwrap();
    runner.signal(pid, Signal::SIGKILL).unwrap();
    assert_eq!(wait_for_exit(&runner, pid), 128 + Signal::SIGKILL as i32);
}

#[test]
fn signal_to_missing_process_is_not_found() {
    let runner = ProcessRunner::new();
    assert_eq!(runner.signal(0x7fff_fff0, Signal::SIGTERM), Err(SignalError::NotFound));
    assert_eq!(runner.signal(u32::MAX, Signal::SIGTERM), Err(SignalError::NotFound));
}

#[test]
fn process_runner_confirms_through_handoff() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = ClientEndpoint::new(AuthKey::default(), None, None);
    let job = job(&["/bin/true"], dir.path(), endpoint);
    let runner = ProcessRunner::new();

    let pid = runner.spawn(&job, &job.tasks()[0]).unwrap();
    job.handoff().wait_ready().unwrap();
    assert_eq!(wait_for_exit(&runner, pid), 0);
}

#[test]
fn unconfirmed_spawn_is_reaped_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = ClientEndpoint::new(AuthKey::default(), None, None);
    // read-only write end: the confirmation cannot be written
    let pipe = HandoffPipe::new(File::open("/dev/null").unwrap(), File::open("/dev/null").unwrap());
    let job = job_with_pipe(&["/bin/sleep", "30"], dir.path(), endpoint, pipe);

    let err = ProcessRunner::new().spawn(&job, &job.tasks()[0]).unwrap_err();
    assert!(matches!(err, SpawnError::Handoff(_)));
}

#[test]
fn spawn_without_executable_fails() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = ClientEndpoint::new(AuthKey::default(), None, None);
    let job = job(&[], dir.path(), endpoint);
    let err = ProcessRunner::new().spawn(&job, &job.tasks()[0]).unwrap_err();
    assert!(matches!(err, SpawnError::NoExecutable));
}

#[test]
fn fake_runner_scripts_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = ClientEndpoint::new(AuthKey::default(), None, None);
    let job = job(&["/bin/true"], dir.path(), endpoint);
    let runner = FakeTaskRunner::new();

    let pid = runner.spawn(&job, &job.tasks()[0]).unwrap();
    assert_eq!(runner.spawned(), vec![(0, pid)]);
    job.handoff().wait_ready().unwrap();

    runner.signal(pid, Signal::SIGUSR1).unwrap();
    runner.set_gone(pid);
    assert_eq!(runner.signal(pid, Signal::SIGKILL), Err(SignalError::NotFound));
    assert_eq!(runner.signals(), vec![SignalCall { pid, signal: Signal::SIGUSR1 }]);

    assert_eq!(runner.try_wait(pid).unwrap(), None);
    runner.set_exited(pid, 0);
    assert_eq!(runner.try_wait(pid).unwrap(), Some(0));
}
