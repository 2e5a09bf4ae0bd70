// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Publishing jobs in the shared step table.

use nd_core::{JobRecord, StepKey};
use nd_storage::{StepEntry, StepTable, TableError};
use tracing::{debug, error};

/// Step-table entry describing `job`.
pub fn step_entry(job: &JobRecord) -> StepEntry {
    StepEntry::new(job.key(), job.user.uid)
        .ntasks(job.ntasks)
        .timelimit(job.timelimit)
        .exec_name(job.exec_name())
}

/// Insert (or refresh) the table entry for `job`.
///
/// Failures are logged here; callers decide whether to carry on.
pub fn register_step<T: StepTable + ?Sized>(job: &JobRecord, table: &T) -> Result<(), TableError> {
    let key = job.key();
    match table.insert(step_entry(job)) {
        Ok(()) => {
            debug!("updated step table with {}", describe(key));
            Ok(())
        }
        Err(e) => {
            error!(job = %key, error = %e, "updating step table with new step info");
            Err(e)
        }
    }
}

/// Remove the table entry for `key`; a missing entry is logged.
pub fn unregister_step<T: StepTable + ?Sized>(key: StepKey, table: &T) -> Result<(), TableError> {
    table.delete(key).inspect_err(|e| match e {
        TableError::NotFound(_) => error!("deleting {}: not found in step table", describe(key)),
        other => error!(job = %key, error = %other, "deleting step table entry"),
    })
}

/// "job N" for batch jobs, "step N.M" otherwise
pub fn describe(key: StepKey) -> String {
    if key.is_batch() {
        format!("job {key}")
    } else {
        format!("step {key}")
    }
}
