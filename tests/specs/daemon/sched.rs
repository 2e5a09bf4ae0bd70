//! Scheduler hook specs

use nd_adapters::{BasicPriority, FakeMigration, PriorityJob};
use nd_daemon::{HookError, SchedPlugin, SchedSettings};
use std::time::Duration;

fn settings() -> SchedSettings {
    SchedSettings { interval: Duration::from_millis(5), disabled: false }
}

#[tokio::test]
async fn hook_start_stop_cycle() {
    let migration = FakeMigration::new();
    let hook = SchedPlugin::new(migration.clone(), BasicPriority, settings);

    hook.start().unwrap();
    assert!(matches!(hook.start(), Err(HookError::AlreadyRunning)));
    for _ in 0..1000 {
        if migration.passes() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(migration.passes() > 0);
    hook.stop().await;
    assert!(!hook.is_running());
}

#[test]
fn initial_priority_follows_submission_order() {
    let hook = SchedPlugin::new(FakeMigration::new(), BasicPriority, settings);
    let first = hook.initial_priority(10_000, &PriorityJob::new(1));
    let second = hook.initial_priority(first, &PriorityJob::new(2));
    let niced = hook.initial_priority(second, &PriorityJob::new(3).nice(100));
    assert!(first > second);
    assert_eq!(niced, second - 1 - 100);
    assert_eq!(hook.initial_priority(1, &PriorityJob::new(4).direct_priority(42u32)), 42);
}
