// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::types::RunId;

#[derive(Error, Debug)]
pub enum SimrunError {
    /// The run's workspace directory could not be created. Fatal to the
    /// submission: the run never starts.
    #[error("could not create workspace {path}: {reason}")]
    WorkspaceCreation { path: String, reason: String },

    /// The shell for a run could not be spawned.
    #[error("failed to spawn process for run {run_id}: {reason}")]
    ProcessSpawn { run_id: RunId, reason: String },

    /// Artifact collection failed (local copy or remote copy command).
    #[error("artifact collection failed: {0}")]
    Collection(String),

    /// The run collection could not be written to the store.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Run not found: {0}")]
    RunNotFound(RunId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SimrunError>;
