// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound request messages handled by the step agent.
//!
//! These are the decoded bodies of launch and batch requests. Framing and
//! transport live elsewhere; the signature in [`Credential`] has already been
//! verified by the time a request reaches the agent.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;

pub use request::{BatchRequest, Credential, LaunchRequest};

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
