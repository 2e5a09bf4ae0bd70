// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the collaborators the step agent drives: the task runner,
//! the password database, output-name templates, pipe allocation and the
//! cluster priority subsystem.

pub mod identity;
pub mod names;
pub mod pipes;
pub mod priority;
pub mod runner;

pub use identity::{IdentityAdapter, IdentityError, SystemIdentity};
pub use names::{NameContext, NameTemplate, PatternNames};
pub use pipes::{OsPipes, PipeAdapter};
pub use priority::{
    BasicPriority, MigrationAdapter, MigrationError, NoopMigration, PriorityAdapter, PriorityJob,
};
pub use runner::{ProcessRunner, SignalError, SpawnError, TaskRunner};

#[cfg(any(test, feature = "test-support"))]
pub use identity::FakeIdentity;
#[cfg(any(test, feature = "test-support"))]
pub use pipes::FakePipes;
#[cfg(any(test, feature = "test-support"))]
pub use priority::{FakeMigration, FakePriority};
#[cfg(any(test, feature = "test-support"))]
pub use runner::{FakeTaskRunner, SignalCall};
