#![allow(dead_code)]

use std::path::PathBuf;

pub use simrun_test_utils::{init_tracing, with_timeout};

use simrun::record::RunRecord;
use simrun_test_utils::builders::RunRequestBuilder;

/// A fresh `Running` record for a local run of `steps` steps.
pub fn local_record(run_id: u64, steps: u64) -> RunRecord {
    RunRecord::new(
        run_id,
        RunRequestBuilder::new("sim").steps(steps).build(),
        PathBuf::from(format!("/ws/run_{run_id}")),
    )
}

/// A fresh `Running` record for a remote run.
pub fn remote_record(run_id: u64) -> RunRecord {
    RunRecord::new(
        run_id,
        RunRequestBuilder::new("spell run sim").remote().steps(100).build(),
        PathBuf::from(format!("/ws/run_{run_id}")),
    )
}
