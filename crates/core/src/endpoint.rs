// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client endpoints: the remote process that requested a step and receives
//! its I/O and completion messages.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Size of the authentication key carried by a client endpoint.
pub const KEY_SIZE: usize = 16;

/// Fixed-size secret identifying a client's right to a task's I/O.
///
/// `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct AuthKey([u8; KEY_SIZE]);

impl AuthKey {
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copy key material from a credential signature.
    ///
    /// Takes the first [`KEY_SIZE`] bytes; shorter input is zero-padded.
    pub fn from_slice(data: &[u8]) -> Self {
        let mut key = [0u8; KEY_SIZE];
        let n = data.len().min(KEY_SIZE);
        key[..n].copy_from_slice(&data[..n]);
        Self(key)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Constant-time comparison against presented key material.
    pub fn matches(&self, other: &[u8]) -> bool {
        if other.len() != KEY_SIZE {
            return false;
        }
        self.0.iter().zip(other).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthKey(..)")
    }
}

/// Index of a [`ClientEndpoint`] inside its job's endpoint list.
///
/// Tasks hold these instead of the endpoint itself; the job owns the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(pub usize);

/// Identity and delivery addresses of a requesting client (an "srun").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEndpoint {
    pub key: AuthKey,
    /// Where launch responses and exit messages go
    pub resp_addr: Option<SocketAddr>,
    /// Where task stdio is streamed
    pub io_addr: Option<SocketAddr>,
    /// stdout override; `None` streams to the client
    pub ofname: Option<PathBuf>,
    /// stderr override; `None` streams to the client
    pub efname: Option<PathBuf>,
    /// stdin override; `None` reads from the client
    pub ifname: Option<PathBuf>,
}

impl ClientEndpoint {
    pub fn new(key: AuthKey, resp_addr: Option<SocketAddr>, io_addr: Option<SocketAddr>) -> Self {
        Self { key, resp_addr, io_addr, ofname: None, efname: None, ifname: None }
    }

    crate::setters! {
        option {
            ofname: PathBuf,
            efname: PathBuf,
            ifname: PathBuf,
        }
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
