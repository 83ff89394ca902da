// src/interpret/machine.rs

//! Per-run state machine.
//!
//! ```text
//! Running --terminal marker--> CollectingArtifacts --ok--> Complete
//!    |                                   |
//!    +--spawn failure--> Failed <--err---+
//! ```
//!
//! Snapshots are applied in every state; terminal markers only act while the
//! run is `Running`, so artifacts are collected at most once.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::interpret::classifier::{LineClass, classify_line};
use crate::record::{ArtifactEntry, RunRecord, StreamLine};
use crate::types::{RunStatus, StreamTag};

/// Artifact collection the supervisor must perform after a terminal marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionRequest {
    /// Copy every file in `source` into `dest`.
    Local { source: PathBuf, dest: PathBuf },
    /// Run the remote copy command for `job_id` into `dest`.
    Remote { job_id: String, dest: PathBuf },
}

/// Result of a collection as reported back to the state machine. The error
/// side carries a human-readable reason that ends up in `RunRecord::error`.
pub type CollectionOutcome = std::result::Result<Vec<ArtifactEntry>, String>;

/// Apply one output line to `record`.
///
/// The caller has already appended the line to `raw_lines`. Error-stream
/// lines never change state. Returns the collection to start when this line
/// was the run's terminal marker.
pub fn interpret(record: &mut RunRecord, line: &StreamLine) -> Option<CollectionRequest> {
    if line.tag == StreamTag::Error {
        return None;
    }

    let classes = classify_line(&line.text, record.platform, record.remote_job_id.as_deref());

    let mut request = None;
    for class in classes {
        match class {
            LineClass::RemoteJobAnnounced(job_id) => {
                if record.set_remote_job_id(job_id.clone()) {
                    info!(run_id = record.run_id, job_id = %job_id, "remote job announced");
                }
            }
            LineClass::Progress(snapshot) => {
                record.push_snapshot(snapshot);
            }
            LineClass::LocalComplete(source) => {
                let dest = record.workspace_path.clone();
                request = begin_collection(record, CollectionRequest::Local { source, dest });
            }
            LineClass::RemoteComplete => match record.remote_job_id.clone() {
                Some(job_id) => {
                    let dest = record.workspace_path.clone();
                    request =
                        begin_collection(record, CollectionRequest::Remote { job_id, dest });
                }
                None => warn!(
                    run_id = record.run_id,
                    "remote completion without a known job id; ignoring"
                ),
            },
            LineClass::Unrecognized => {}
        }
    }

    request
}

fn begin_collection(
    record: &mut RunRecord,
    request: CollectionRequest,
) -> Option<CollectionRequest> {
    if record.status != RunStatus::Running {
        debug!(
            run_id = record.run_id,
            status = %record.status,
            "terminal marker seen again; ignoring"
        );
        return None;
    }

    info!(run_id = record.run_id, ?request, "run finished; collecting artifacts");
    record.status = RunStatus::CollectingArtifacts;
    Some(request)
}

/// Record the outcome of an artifact collection.
pub fn finish_collection(record: &mut RunRecord, outcome: CollectionOutcome) {
    if record.status != RunStatus::CollectingArtifacts {
        warn!(
            run_id = record.run_id,
            status = %record.status,
            "collection result for a run that is not collecting; ignoring"
        );
        return;
    }

    match outcome {
        Ok(artifacts) => {
            info!(
                run_id = record.run_id,
                artifacts = artifacts.len(),
                "artifacts collected; run complete"
            );
            record.artifacts.extend(artifacts);
            record.status = RunStatus::Complete;
        }
        Err(reason) => mark_failed(record, reason),
    }
}

/// Move the run to `Failed` with a reason observers can read.
pub fn mark_failed(record: &mut RunRecord, reason: impl Into<String>) {
    let reason = reason.into();
    warn!(run_id = record.run_id, reason = %reason, "run failed");
    record.status = RunStatus::Failed;
    record.error = Some(reason);
}

/// Record the process exit code. Status is left to the output markers.
pub fn record_exit(record: &mut RunRecord, code: Option<i32>) {
    debug!(run_id = record.run_id, ?code, "recording process exit");
    record.exit_code = code;
}
