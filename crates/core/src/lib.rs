// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nd-core: domain types for the node-local step agent

pub mod macros;

pub mod endpoint;
pub mod handoff;
pub mod id;
pub mod identity;
pub mod io;
pub mod job;
pub mod step;
pub mod task;

pub use endpoint::{AuthKey, ClientEndpoint, EndpointId, KEY_SIZE};
pub use handoff::HandoffPipe;
pub use id::{JobId, StepId, StepKey, NO_VAL};
pub use identity::UserIdentity;
pub use io::{IoKind, IoObject};
pub use job::{JobBuilder, JobRecord};
pub use step::StepState;
pub use task::{PipePair, TaskError, TaskInner, TaskSnapshot, TaskState, TaskStatus};
