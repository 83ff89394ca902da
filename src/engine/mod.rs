// src/engine/mod.rs

//! Run supervisor.
//!
//! This module ties together:
//! - the run records and their state machines
//! - process output delivered by the process backend
//! - artifact collection results
//! - persistence of the run collection after every change
//!
//! The pure core lives in [`core`] (with its handlers in
//! [`event_handlers`]); the async/IO shell is implemented in [`runtime`].
//! [`handle`] is the submission API for callers outside the runtime task.

use tokio::sync::oneshot;

use crate::errors::Result;
use crate::exec::ProcessEvent;
use crate::interpret::CollectionOutcome;
use crate::record::{RunRecord, RunRequest};
use crate::types::RunId;

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no process is running and no
    /// collection is in flight (used by `simrun run`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from submitters, processes and
/// collectors.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// A new run was requested. The accepted record (or the reason it was
    /// rejected) is sent back on `reply`.
    Submit {
        request: RunRequest,
        reply: oneshot::Sender<Result<RunRecord>>,
    },
    /// Something happened to the process of `run_id`.
    Process { run_id: RunId, event: ProcessEvent },
    /// Artifact collection for `run_id` finished.
    CollectionFinished {
        run_id: RunId,
        outcome: CollectionOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod handle;
pub mod runtime;

pub use self::core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use handle::SupervisorHandle;
pub use runtime::{Runtime, RuntimeContext};
