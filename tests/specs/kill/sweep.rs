//! Kill propagation specs

use crate::prelude::*;
use std::sync::Arc;

#[test]
fn kill_without_entry_delivers_nothing() {
    let table = MemoryStepTable::new();
    let runner = FakeTaskRunner::new();
    let job = create_from_launch(&launch_request(400, 1000, 3, &["/bin/true"]), client(), &deps())
        .unwrap();

    let report = kill_job(&job, &table, &runner, Signal::SIGKILL).unwrap();
    assert!(!report.found);
    assert!(report.sweep.delivered.is_empty());
    assert!(runner.signals().is_empty());
}

#[test]
fn kill_reaches_every_running_task_once() {
    let table = Arc::new(MemoryStepTable::new());
    let runner = FakeTaskRunner::new();
    let agent = Agent::new(deps(), Arc::new(runner.clone()), Arc::clone(&table));

    let key = agent.launch(&launch_request(401, 1000, 4, &["/bin/true"]), client()).unwrap().key();
    agent.start_tasks(key).unwrap();
    // task 2 finished and was reaped before the kill
    agent.task_exited(key, 2, 0).unwrap();

    let report = agent.kill(key, Signal::SIGKILL).unwrap();
    assert_eq!(report.sweep.delivered, vec![0, 1, 3]);
    let mut pids: Vec<u32> = runner.signals().iter().map(|call| call.pid).collect();
    pids.dedup();
    assert_eq!(pids, vec![1000, 1001, 1003]);
    assert_eq!(state_of(table.as_ref(), key), Some(StepState::Ending));
}

#[test]
fn sigkill_sweep_ends_real_processes() {
    let dir = tempfile::tempdir().unwrap();
    let table = Arc::new(FileStepTable::open(dir.path()).unwrap());
    let runner = ProcessRunner::new();
    let uid = nix::unistd::geteuid().as_raw();
    let agent = Agent::new(
        deps_for(uid, &FakePipes::new()),
        Arc::new(runner.clone()),
        Arc::clone(&table),
    );

    let key = agent
        .launch(&launch_request(402, uid, 2, &["/bin/sleep", "30"]), client())
        .unwrap()
        .key();
    agent.start_tasks(key).unwrap();

    let report = agent.kill(key, Signal::SIGKILL).unwrap();
    assert_eq!(report.sweep.delivered.len(), 2);
    eventually("killed tasks to be reaped", || agent.poll_exits().contains(&key));

    let job = agent.job(key).unwrap();
    for task in job.tasks() {
        let inner = task.lock();
        assert_eq!(inner.status, TaskStatus::Killed);
        assert_eq!(inner.exit_status, Some(128 + Signal::SIGKILL as i32));
    }
    drop(job);
    agent.complete(key).unwrap();
    assert!(table.keys().unwrap().is_empty());
}

#[test]
fn kill_during_startup_wins_over_start() {
    let dir = tempfile::tempdir().unwrap();
    let table = Arc::new(FileStepTable::open(dir.path()).unwrap());
    let runner = FakeTaskRunner::new();
    let agent = Agent::new(deps(), Arc::new(runner.clone()), Arc::clone(&table));

    let key = agent.launch(&launch_request(403, 1000, 2, &["/bin/true"]), client()).unwrap().key();
    agent.kill(key, Signal::SIGKILL).unwrap();

    assert_eq!(agent.start_tasks(key).unwrap(), 0);
    assert!(runner.spawned().is_empty());
    assert_eq!(state_of(table.as_ref(), key), Some(StepState::Ending));
    assert_eq!(agent.poll_exits(), vec![key]);
}
