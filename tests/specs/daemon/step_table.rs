//! Shared step table specs

use crate::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[test]
fn holders_on_separate_handles_never_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let key = StepKey::new(500, 0);
    let job = create_from_launch(&launch_request(500, 1000, 1, &["/bin/true"]), client(), &deps())
        .unwrap();
    register_step(&job, &FileStepTable::open(dir.path()).unwrap()).unwrap();

    let held = Arc::new(AtomicBool::new(false));
    let workers: Vec<_> = (0..2)
        .map(|_| {
            let table = FileStepTable::open(dir.path()).unwrap();
            let held = Arc::clone(&held);
            std::thread::spawn(move || {
                for _ in 0..10_000 {
                    let guard = table.lock_entry(key).unwrap().unwrap();
                    assert!(!held.swap(true, Ordering::SeqCst));
                    held.store(false, Ordering::SeqCst);
                    drop(guard);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn entry_exists_only_while_agent_owns_job() {
    let table = Arc::new(MemoryStepTable::new());
    let agent = Agent::new(deps(), Arc::new(FakeTaskRunner::new()), Arc::clone(&table));

    let key = agent.launch(&launch_request(501, 1000, 2, &["/bin/true"]), client()).unwrap().key();
    assert_eq!(table.keys().unwrap(), vec![key]);
    agent.complete(key).unwrap();
    assert!(table.keys().unwrap().is_empty());
    assert!(agent.job(key).is_none());
}
