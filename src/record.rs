// src/record.rs

//! Run requests and the persisted run record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::interpret::Snapshot;
use crate::types::{Platform, RunId, RunStatus, StreamTag};

/// Parameters the requester attached to a run. Only `steps` and `platform`
/// are interpreted; anything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StartParameters {
    #[serde(default)]
    pub steps: u64,

    #[serde(default)]
    pub platform: Platform,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_points: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A request to start one simulation run.
///
/// `run_id` is normally obtained by the requester from the store's counter;
/// when it is `None` the supervisor assigns the next id itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub command: String,
    #[serde(default)]
    pub run_id: Option<RunId>,
    #[serde(default)]
    pub start_parameters: StartParameters,
}

/// One line of process output plus the stream it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLine {
    pub text: String,
    pub tag: StreamTag,
}

impl StreamLine {
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: StreamTag::Normal,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: StreamTag::Error,
        }
    }
}

/// A file copied into a run's workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub name: String,
    pub bytes: u64,
    /// blake3 hex digest of the copied file.
    pub blake3: String,
}

/// Everything the supervisor knows about one run. This is the unit stored
/// under the `"sims"` key and what observers poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: RunId,
    pub command: String,
    pub start_parameters: StartParameters,
    pub platform: Platform,
    pub status: RunStatus,

    /// Latest progress snapshot; always equal to the last history entry.
    #[serde(default)]
    pub state: Option<Snapshot>,
    #[serde(default)]
    pub state_history: Vec<Snapshot>,
    #[serde(default)]
    pub raw_lines: Vec<StreamLine>,

    #[serde(default)]
    pub remote_job_id: Option<String>,
    pub workspace_path: PathBuf,

    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactEntry>,
}

impl RunRecord {
    pub fn new(run_id: RunId, request: RunRequest, workspace_path: PathBuf) -> Self {
        let platform = request.start_parameters.platform;
        Self {
            run_id,
            command: request.command,
            start_parameters: request.start_parameters,
            platform,
            status: RunStatus::Running,
            state: None,
            state_history: Vec::new(),
            raw_lines: Vec::new(),
            remote_job_id: None,
            workspace_path,
            error: None,
            exit_code: None,
            artifacts: Vec::new(),
        }
    }

    /// Append a snapshot to the history and make it the current state.
    pub fn push_snapshot(&mut self, snapshot: Snapshot) {
        self.state_history.push(snapshot.clone());
        self.state = Some(snapshot);
    }

    /// Set the remote job id unless one is already known.
    ///
    /// Returns `true` if the id was recorded.
    pub fn set_remote_job_id(&mut self, job_id: impl Into<String>) -> bool {
        if self.remote_job_id.is_some() {
            return false;
        }
        self.remote_job_id = Some(job_id.into());
        true
    }

    /// Percentage of requested steps reached by the latest snapshot,
    /// clamped to `0..=100`.
    ///
    /// `None` if no snapshot carried `steps` yet or no steps were requested.
    pub fn progress(&self) -> Option<f64> {
        let done = self.state.as_ref()?.steps()?;
        let requested = self.start_parameters.steps;
        if requested == 0 {
            return None;
        }
        Some((done * 100.0 / requested as f64).clamp(0.0, 100.0))
    }
}
