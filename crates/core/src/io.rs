// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! I/O objects attached to a job by the stdio engine.

use crate::endpoint::EndpointId;

/// Which stream an I/O object carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    Stdin,
    Stdout,
    Stderr,
    /// Connection to a client endpoint
    Client,
}

crate::simple_display! {
    IoKind {
        Stdin => "stdin",
        Stdout => "stdout",
        Stderr => "stderr",
        Client => "client",
    }
}

/// A registered I/O object: a task stream or a client connection.
///
/// Owned by the job's I/O list and released with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoObject {
    pub kind: IoKind,
    /// Local task index, for task streams
    pub task: Option<u32>,
    /// Client connection the object feeds, if any
    pub endpoint: Option<EndpointId>,
}

impl IoObject {
    pub fn task_stream(kind: IoKind, task: u32) -> Self {
        Self { kind, task: Some(task), endpoint: None }
    }

    pub fn client(endpoint: EndpointId) -> Self {
        Self { kind: IoKind::Client, task: None, endpoint: Some(endpoint) }
    }
}
