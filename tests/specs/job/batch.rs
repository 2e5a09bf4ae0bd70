//! Batch job specs

use crate::prelude::*;
use std::path::PathBuf;

#[test]
fn batch_without_out_or_err_uses_templated_default() {
    let job = create_from_batch(&batch_request(555, 1000), &deps()).unwrap();

    assert_eq!(job.ntasks, 1);
    assert!(job.key().is_batch());
    assert_eq!(job.key().to_string(), "555");

    let endpoint = job.primary_endpoint();
    let expected = PathBuf::from("/home/alice/job-555.out");
    assert_eq!(endpoint.ofname.as_deref(), Some(expected.as_path()));
    assert_eq!(endpoint.efname, endpoint.ofname);
    assert_eq!(endpoint.ifname, Some(PathBuf::from("/dev/null")));
}

#[test]
fn batch_entry_is_published_as_job() {
    let table = MemoryStepTable::new();
    let job = create_from_batch(&batch_request(556, 1000), &deps()).unwrap();
    job.set_arg(0, "/spool/job556/script");
    register_step(&job, &table).unwrap();

    let guard = table.lock_entry(StepKey::batch(556)).unwrap().unwrap();
    assert_eq!(guard.entry().exec_name, "/spool/job556/script");
    assert_eq!(guard.entry().ntasks, 1);
}
