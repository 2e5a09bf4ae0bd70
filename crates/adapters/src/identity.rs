// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owning-user lookup.

use nd_core::UserIdentity;
use nix::unistd::{Uid, User};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("uid {0} not found on system")]
    NotFound(u32),
    #[error("user lookup for uid {uid} failed: {source}")]
    Lookup { uid: u32, source: nix::Error },
}

/// Resolves a numeric uid to an account snapshot.
pub trait IdentityAdapter: Send + Sync + 'static {
    fn lookup_user(&self, uid: u32) -> Result<UserIdentity, IdentityError>;
}

/// Reads the node's password database.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemIdentity;

impl IdentityAdapter for SystemIdentity {
    fn lookup_user(&self, uid: u32) -> Result<UserIdentity, IdentityError> {
        let user = User::from_uid(Uid::from_raw(uid))
            .map_err(|source| IdentityError::Lookup { uid, source })?
            .ok_or(IdentityError::NotFound(uid))?;
        Ok(UserIdentity::new(user.name, user.uid.as_raw(), user.gid.as_raw())
            .gecos(user.gecos.to_string_lossy().into_owned())
            .home(user.dir)
            .shell(user.shell))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{IdentityAdapter, IdentityError};
    use nd_core::UserIdentity;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// In-memory password database.
    #[derive(Clone, Default)]
    pub struct FakeIdentity {
        users: Arc<Mutex<HashMap<u32, UserIdentity>>>,
    }

    impl FakeIdentity {
        pub fn new() -> Self {
            Self::default()
        }

        /// A database holding a single user.
        pub fn with_user(name: &str, uid: u32, gid: u32) -> Self {
            let fake = Self::new();
            fake.add(UserIdentity::new(name, uid, gid).home(format!("/home/{name}")));
            fake
        }

        pub fn add(&self, user: UserIdentity) {
            self.users.lock().insert(user.uid, user);
        }
    }

    impl IdentityAdapter for FakeIdentity {
        fn lookup_user(&self, uid: u32) -> Result<UserIdentity, IdentityError> {
            self.users.lock().get(&uid).cloned().ok_or(IdentityError::NotFound(uid))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeIdentity;
