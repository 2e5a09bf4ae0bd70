//! End-to-end step lifecycle with real processes and a file-backed table.

use crate::prelude::*;
use std::sync::Arc;

fn agent(table: &Arc<FileStepTable>) -> Agent<ProcessRunner, FileStepTable> {
    let uid = nix::unistd::geteuid().as_raw();
    Agent::new(deps_for(uid, &FakePipes::new()), Arc::new(ProcessRunner::new()), Arc::clone(table))
}

#[test]
fn step_runs_to_completion_and_leaves_no_entry() {
    let dir = tempfile::tempdir().unwrap();
    let table = Arc::new(FileStepTable::open(dir.path().join("steps")).unwrap());
    let agent = agent(&table);

    let uid = nix::unistd::geteuid().as_raw();
    let mut req = launch_request(200, uid, 2, &["/bin/sh", "-c", "exit 0"]);
    req.cwd = dir.path().to_owned();
    let key = agent.launch(&req, client()).unwrap().key();
    assert_eq!(agent.start_tasks(key).unwrap(), 2);

    // another handle on the same directory sees the published state
    let reader = FileStepTable::open(dir.path().join("steps")).unwrap();
    assert_eq!(state_of(&reader, key), Some(StepState::Running));

    eventually("tasks to exit", || agent.poll_exits().contains(&key));
    let job = agent.job(key).unwrap();
    assert!(job.tasks().iter().all(|t| t.lock().exit_status == Some(0)));
    drop(job);

    agent.complete(key).unwrap();
    assert!(agent.is_empty());
    assert_eq!(state_of(&reader, key), None);
}

#[test]
fn batch_output_lands_in_templated_file() {
    let dir = tempfile::tempdir().unwrap();
    let table = Arc::new(FileStepTable::open(dir.path().join("steps")).unwrap());
    let agent = agent(&table);

    let uid = nix::unistd::geteuid().as_raw();
    let mut req = batch_request(300, uid);
    req.work_dir = dir.path().to_owned();
    req.environment = vec!["GREETING=hello".to_string()];
    let job = agent.launch_batch(&req).unwrap();
    job.set_arg(0, "/bin/sh");
    job.set_arg(1, "-c");
    job.set_arg(2, "echo $GREETING $ND_JOBID");
    let key = job.key();
    drop(job);

    agent.start_tasks(key).unwrap();
    eventually("batch script to exit", || agent.poll_exits().contains(&key));
    agent.complete(key).unwrap();

    let out = std::fs::read_to_string(dir.path().join("job-300.out")).unwrap();
    assert_eq!(out, "hello 300\n");
}
