// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node-local step agent library.
//!
//! Builds job records from launch and batch requests, publishes them in the
//! shared step table, propagates signals, and hosts the scheduler hook.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod agent;
pub mod create;
pub mod env;
pub mod kill;
pub mod lifecycle;
pub mod sched;
pub mod step;

#[cfg(test)]
mod test_helpers;

pub use agent::{Agent, AgentError, SPAWN_FAILED_STATUS};
pub use create::{create_from_batch, create_from_launch, CreateDeps, CreateError};
pub use kill::{kill_job, signal_tasks, KillReport, Sweep};
pub use lifecycle::{Config, LifecycleError};
pub use sched::{HookError, SchedPlugin, SchedSettings};
pub use step::{register_step, step_entry, unregister_step};
