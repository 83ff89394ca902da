// src/interpret/mod.rs

//! Turning process output lines into run state.
//!
//! - [`snapshot`] parses progress snapshots (one JSON object per line).
//! - [`classifier`] maps a line to the closed set of [`LineClass`] variants.
//! - [`machine`] applies classified lines to a [`RunRecord`] and drives the
//!   `Running -> CollectingArtifacts -> Complete | Failed` transitions.
//!
//! Nothing in here performs IO. When a terminal marker is seen the machine
//! hands back a [`CollectionRequest`] for the supervisor to execute.
//!
//! [`RunRecord`]: crate::record::RunRecord

pub mod classifier;
pub mod machine;
pub mod snapshot;

pub use classifier::{
    LineClass, REMOTE_JOB_MARKER, SIMULATION_COMPLETE_MARKER, classify_line,
};
pub use machine::{
    CollectionOutcome, CollectionRequest, finish_collection, interpret, mark_failed,
    record_exit,
};
pub use snapshot::{Snapshot, SnapshotParseError, parse_snapshot};
