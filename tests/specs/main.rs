//! Workspace scenario specs for the node-local step agent.

// Allow panic!/unwrap/expect in test code
#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

mod prelude;

mod job {
    mod batch;
    mod launch;
    mod lifecycle;
}

mod kill {
    mod sweep;
}

mod daemon {
    mod sched;
    mod step_table;
}
