// src/interpret/classifier.rs

//! Line classification against the output protocol of the simulation.
//!
//! The simulation program has no structured channel besides its stdout, so
//! these markers are matched textually:
//!
//! - `Casting spell #<id>.`        remote job announced (remote platform)
//! - `{...}`                       progress snapshot (any JSON object)
//! - `Simulation complete: <path>` results are ready in `<path>` (local)
//! - `Run <id> complete`           remote results are ready (remote)

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::interpret::snapshot::{Snapshot, parse_snapshot};
use crate::types::Platform;

/// Prefix of the local terminal line.
pub const SIMULATION_COMPLETE_MARKER: &str = "Simulation complete";

/// Substring announcing the remote job id.
pub const REMOTE_JOB_MARKER: &str = "Casting spell #";

static REMOTE_JOB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Casting spell #([^.\s]+)").expect("remote job regex is valid")
});

/// What a single line means for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum LineClass {
    Progress(Snapshot),
    RemoteJobAnnounced(String),
    LocalComplete(PathBuf),
    RemoteComplete,
    Unrecognized,
}

/// Classify one stdout line.
///
/// A line may carry more than one meaning, so the result is a list in the
/// order the meanings must be applied: job announcement, then progress, then
/// the terminal marker. `remote_job_id` is the id already known for the run;
/// a job announced on this very line is taken into account for the terminal
/// check. Lines with no meaning yield `[Unrecognized]`.
pub fn classify_line(
    text: &str,
    platform: Platform,
    remote_job_id: Option<&str>,
) -> Vec<LineClass> {
    let mut classes = Vec::new();
    let mut job_id = remote_job_id.map(str::to_string);

    if platform == Platform::Remote && job_id.is_none() {
        if let Some(id) = extract_remote_job_id(text) {
            job_id = Some(id.clone());
            classes.push(LineClass::RemoteJobAnnounced(id));
        }
    }

    match parse_snapshot(text) {
        Ok(snapshot) => classes.push(LineClass::Progress(snapshot)),
        Err(err) => trace!(error = %err, "line is not a snapshot"),
    }

    match platform {
        Platform::Local => {
            if let Some(path) = local_results_path(text) {
                classes.push(LineClass::LocalComplete(path));
            }
        }
        Platform::Remote => {
            if let Some(id) = job_id.as_deref() {
                if is_remote_complete(text, id) {
                    classes.push(LineClass::RemoteComplete);
                }
            }
        }
    }

    if classes.is_empty() {
        classes.push(LineClass::Unrecognized);
    }
    classes
}

/// Pull the job id out of `... Casting spell #<id>. ...`.
pub fn extract_remote_job_id(text: &str) -> Option<String> {
    if !text.contains(REMOTE_JOB_MARKER) {
        return None;
    }
    REMOTE_JOB_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// For `Simulation complete<anything>: <path>` return `<path>`.
///
/// Both `Simulation complete: /out` and the longer
/// `Simulation complete. Requested files are stored at: /out` are accepted.
pub fn local_results_path(text: &str) -> Option<PathBuf> {
    if !text.starts_with(SIMULATION_COMPLETE_MARKER) {
        return None;
    }
    let (_, rest) = text.split_once(": ")?;
    let path = rest.trim();
    if path.is_empty() {
        return None;
    }
    Some(PathBuf::from(path))
}

fn is_remote_complete(text: &str, job_id: &str) -> bool {
    text.trim() == format!("Run {job_id} complete")
}
