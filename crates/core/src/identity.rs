// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot of the owning user's account.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Owned copy of a password-database entry, taken at job creation so later
/// account changes on the node do not affect a running step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub home: PathBuf,
    pub shell: PathBuf,
}

impl UserIdentity {
    pub fn new(name: impl Into<String>, uid: u32, gid: u32) -> Self {
        Self {
            name: name.into(),
            uid,
            gid,
            gecos: String::new(),
            home: PathBuf::from("/"),
            shell: PathBuf::from("/bin/sh"),
        }
    }

    crate::setters! {
        into {
            gecos: String,
            home: PathBuf,
            shell: PathBuf,
        }
    }
}
