// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster priority and migration collaborators.

use async_trait::async_trait;
use nd_core::JobId;
use thiserror::Error;

/// Priority-relevant view of a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityJob {
    pub job_id: JobId,
    /// Positive values lower the priority, negative values raise it.
    pub nice: i32,
    /// Priority requested explicitly by an operator.
    pub direct_priority: Option<u32>,
}

impl PriorityJob {
    pub fn new(job_id: impl Into<JobId>) -> Self {
        Self { job_id: job_id.into(), nice: 0, direct_priority: None }
    }

    nd_core::setters! {
        set { nice: i32 }
        option { direct_priority: u32 }
    }
}

/// Assigns the initial priority of a newly submitted job.
pub trait PriorityAdapter: Send + Sync + 'static {
    /// `last` is the priority handed to the previous job.
    fn set(&self, last: u32, job: &PriorityJob) -> u32;
}

/// Submission-order priority: each job gets one less than the previous,
/// never below 1, shifted by its nice value.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicPriority;

impl PriorityAdapter for BasicPriority {
    fn set(&self, last: u32, job: &PriorityJob) -> u32 {
        if let Some(direct) = job.direct_priority {
            return direct;
        }
        let base = i64::from(last.saturating_sub(1).max(1));
        let adjusted = base - i64::from(job.nice);
        u32::try_from(adjusted.clamp(1, i64::from(u32::MAX))).unwrap_or(1)
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration pass failed: {0}")]
    Pass(String),
}

/// One pass of the background migration scheduler.
#[async_trait]
pub trait MigrationAdapter: Send + Sync + 'static {
    /// Run a pass and return how many jobs were re-prioritised.
    async fn run_pass(&self) -> Result<usize, MigrationError>;
}

/// Migration pass that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMigration;

#[async_trait]
impl MigrationAdapter for NoopMigration {
    async fn run_pass(&self) -> Result<usize, MigrationError> {
        Ok(0)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{MigrationAdapter, MigrationError, PriorityAdapter, PriorityJob};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Returns a fixed priority and records every call.
    #[derive(Clone, Default)]
    pub struct FakePriority {
        value: u32,
        calls: Arc<Mutex<Vec<(u32, PriorityJob)>>>,
    }

    impl FakePriority {
        pub fn returning(value: u32) -> Self {
            Self { value, calls: Arc::default() }
        }

        pub fn calls(&self) -> Vec<(u32, PriorityJob)> {
            self.calls.lock().clone()
        }
    }

    impl PriorityAdapter for FakePriority {
        fn set(&self, last: u32, job: &PriorityJob) -> u32 {
            self.calls.lock().push((last, *job));
            self.value
        }
    }

    /// Counts passes; can be told to fail or to take a while.
    #[derive(Clone, Default)]
    pub struct FakeMigration {
        passes: Arc<AtomicUsize>,
        failing: Arc<AtomicBool>,
        delay: Arc<Mutex<Duration>>,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl FakeMigration {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn passes(&self) -> usize {
            self.passes.load(Ordering::SeqCst)
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Make every pass sleep for `delay` before returning.
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock() = delay;
        }

        /// Passes currently running, across all clones
        pub fn in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }

        /// Most passes ever seen running at once
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    /// Decrements the in-flight count even when the pass is dropped.
    struct InFlight(Arc<AtomicUsize>);

    impl Drop for InFlight {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl MigrationAdapter for FakeMigration {
        async fn run_pass(&self) -> Result<usize, MigrationError> {
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            let _in_flight = InFlight(Arc::clone(&self.in_flight));
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);
            self.passes.fetch_add(1, Ordering::SeqCst);

            let delay = *self.delay.lock();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(MigrationError::Pass("scripted failure".to_string()));
            }
            Ok(0)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMigration, FakePriority};
