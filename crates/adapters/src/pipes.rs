// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handoff pipe allocation.

use nd_core::HandoffPipe;
use nix::unistd::pipe;
use std::fs::File;
use std::io;

/// Allocates the startup-handoff pipe for a new job.
pub trait PipeAdapter: Send + Sync + 'static {
    fn open(&self) -> io::Result<HandoffPipe>;
}

/// Anonymous OS pipes.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsPipes;

impl PipeAdapter for OsPipes {
    fn open(&self) -> io::Result<HandoffPipe> {
        let (read, write) = pipe().map_err(io::Error::from)?;
        Ok(HandoffPipe::new(File::from(read), File::from(write)))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{OsPipes, PipeAdapter};
    use nd_core::HandoffPipe;
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Real pipes with a failure switch and an open counter.
    #[derive(Clone, Default)]
    pub struct FakePipes {
        failing: Arc<AtomicBool>,
        opened: Arc<AtomicUsize>,
    }

    impl FakePipes {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail every `open` with `EMFILE` while set.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Pipes successfully opened so far
        pub fn opened(&self) -> usize {
            self.opened.load(Ordering::SeqCst)
        }
    }

    impl PipeAdapter for FakePipes {
        fn open(&self) -> io::Result<HandoffPipe> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(io::Error::from(nix::errno::Errno::EMFILE));
            }
            let pipe = OsPipes.open()?;
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(pipe)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePipes;
