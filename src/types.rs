// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique, monotonically assigned run identifier.
pub type RunId = u64;

/// Where the simulation actually executes.
///
/// - `Local`: the process writes its results to a local directory and
///   announces it with `Simulation complete: <path>`.
/// - `Remote`: the process submits a job to a remote platform, announces the
///   job with `Casting spell #<id>.` and later `Run <id> complete`. Results are
///   fetched with the configured remote copy command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Local,
    #[serde(alias = "spell")]
    Remote,
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Platform::Local),
            "remote" | "spell" => Ok(Platform::Remote),
            other => Err(format!(
                "invalid platform: {other} (expected \"local\" or \"remote\")"
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Local => f.pad("local"),
            Platform::Remote => f.pad("remote"),
        }
    }
}

/// Which output stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamTag {
    /// stdout
    Normal,
    /// stderr
    Error,
}

/// Lifecycle of a run as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Process started (or starting); output is being interpreted.
    Running,
    /// A terminal marker was seen; artifacts are being copied.
    CollectingArtifacts,
    /// Artifacts collected.
    Complete,
    /// Spawn or collection failed; see the record's `error`.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Running => "running",
            RunStatus::CollectingArtifacts => "collecting",
            RunStatus::Complete => "complete",
            RunStatus::Failed => "failed",
        };
        f.pad(s)
    }
}
