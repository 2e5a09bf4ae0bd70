//! Interactive launch specs
//!
//! Verify the record built from a launch request and the rollback when the
//! handoff pipe cannot be allocated.

use crate::prelude::*;

#[test]
fn four_task_launch_builds_init_tasks_and_one_endpoint() {
    let req = launch_request(100, 1000, 4, &["/bin/true"]);
    let job = create_from_launch(&req, client(), &deps()).unwrap();

    assert_eq!(job.tasks().len(), 4);
    let mut ids: Vec<u32> = job.tasks().iter().map(|t| t.id()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert!(job.tasks().iter().all(|t| t.status() == TaskStatus::Init));
    assert_eq!(job.endpoint_count(), 1);
    assert_eq!(job.env, vec!["A=1".to_string()]);
    assert_eq!(job.argv(), vec!["/bin/true".to_string()]);
    assert_eq!(job.user.uid, 1000);

    job.destroy();
}

#[test]
fn unknown_user_is_identity_resolution() {
    let req = launch_request(101, 4242, 1, &["/bin/true"]);
    let err = create_from_launch(&req, client(), &deps()).unwrap_err();
    assert!(matches!(err, CreateError::IdentityResolution(_)));
}

#[test]
fn pipe_failure_leaves_no_job_and_no_entry() {
    let pipes = FakePipes::new();
    pipes.set_failing(true);
    let table = std::sync::Arc::new(MemoryStepTable::new());
    let agent = Agent::new(
        deps_for(1000, &pipes),
        std::sync::Arc::new(FakeTaskRunner::new()),
        std::sync::Arc::clone(&table),
    );

    let req = launch_request(102, 1000, 4, &["/bin/true"]);
    assert!(agent.launch(&req, client()).is_err());
    assert!(agent.job(req.key()).is_none());
    assert!(table.is_empty());

    // the same request goes through once pipes are available again
    pipes.set_failing(false);
    let job = agent.launch(&req, client()).unwrap();
    assert_eq!(job.tasks().len(), 4);
    assert_eq!(state_of(table.as_ref(), req.key()), Some(StepState::Starting));
}
