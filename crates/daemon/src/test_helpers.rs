// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for daemon unit tests.

use std::sync::Arc;

use nd_adapters::{FakeIdentity, FakePipes, OsPipes, PatternNames, PipeAdapter};
use nd_core::{AuthKey, ClientEndpoint, JobBuilder, JobRecord, StepKey, UserIdentity};

use crate::CreateDeps;

/// A `/bin/true` job owned by alice (uid 1000) with `ntasks` Init tasks.
pub(crate) fn launch_job(key: StepKey, ntasks: u32) -> JobRecord {
    let endpoint = ClientEndpoint::new(AuthKey::default(), None, None);
    JobBuilder::new(key, UserIdentity::new("alice", 1000, 100), endpoint)
        .ntasks(ntasks)
        .argv(&["/bin/true".to_string()])
        .init_tasks(&[])
        .build(OsPipes.open().unwrap())
}

/// Creation deps backed by fakes; alice is uid 1000.
pub(crate) fn fake_deps(pipes: &FakePipes) -> CreateDeps {
    CreateDeps::new(
        Arc::new(FakeIdentity::with_user("alice", 1000, 100)),
        Arc::new(pipes.clone()),
        Arc::new(PatternNames),
    )
}
