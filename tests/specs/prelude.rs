//! Shared fixtures for the scenario specs.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use nd_adapters::{
    FakeIdentity, FakePipes, FakeTaskRunner, PatternNames, ProcessRunner, SignalCall, TaskRunner,
};
pub use nd_core::{JobRecord, StepKey, StepState, TaskStatus};
pub use nd_daemon::{
    create_from_batch, create_from_launch, kill_job, register_step, Agent, CreateDeps, CreateError,
};
pub use nd_storage::{FileStepTable, MemoryStepTable, StepTable};
pub use nd_wire::{BatchRequest, Credential, LaunchRequest};
pub use nix::sys::signal::Signal;

/// Creation deps with alice at `uid` and the given pipe source.
pub fn deps_for(uid: u32, pipes: &FakePipes) -> CreateDeps {
    CreateDeps::new(
        Arc::new(FakeIdentity::with_user("alice", uid, uid)),
        Arc::new(pipes.clone()),
        Arc::new(PatternNames),
    )
}

pub fn deps() -> CreateDeps {
    deps_for(1000, &FakePipes::new())
}

pub fn client() -> SocketAddr {
    "192.0.2.10:7000".parse().unwrap()
}

pub fn launch_request(job_id: u32, uid: u32, tasks: u32, argv: &[&str]) -> LaunchRequest {
    LaunchRequest {
        job_id,
        job_step_id: 0,
        uid,
        nprocs: tasks,
        nnodes: 1,
        srun_node_id: 0,
        tasks_to_launch: tasks,
        slurmd_debug: 0,
        credential: Credential { expiration_time: 0, signature: vec![0xab; 16] },
        task_flags: 0,
        env: vec!["A=1".to_string()],
        argv: argv.iter().map(|s| s.to_string()).collect(),
        cwd: PathBuf::from("/tmp"),
        resp_port: 7001,
        io_port: 7002,
        ofname: None,
        efname: None,
        ifname: None,
        global_task_ids: (0..tasks).collect(),
    }
}

pub fn batch_request(job_id: u32, uid: u32) -> BatchRequest {
    BatchRequest {
        job_id,
        uid,
        work_dir: PathBuf::from("/home/alice"),
        environment: vec![],
        argc: 0,
        out: None,
        err: None,
    }
}

pub fn state_of(table: &dyn StepTable, key: StepKey) -> Option<StepState> {
    table.lock_entry(key).unwrap().map(|guard| guard.state())
}

/// Poll `done` until it holds, failing after ten seconds.
pub fn eventually(what: &str, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(10));
    }
}
