// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::exec::ProcessEvent;
use crate::interpret::{self, CollectionOutcome, CollectionRequest};
use crate::record::RunRecord;
use crate::types::RunId;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreCommand {
    /// Write the whole run collection to the store.
    Persist,
    /// Start the process for a freshly accepted run.
    StartProcess { run_id: RunId, command: String },
    /// Collect artifacts for a run that reached its terminal marker.
    Collect {
        run_id: RunId,
        request: CollectionRequest,
    },
    /// Request that the runtime exits (used when idle and `exit_when_idle`).
    RequestExit,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Work the supervisor is still waiting on.
#[derive(Debug, Default)]
pub struct InFlight {
    pub processes: HashSet<RunId>,
    pub collections: HashSet<RunId>,
}

impl InFlight {
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty() && self.collections.is_empty()
    }
}

/// Handle one process event for `run_id`.
///
/// Lines are appended to the record's raw log, then interpreted. Every
/// event that touched a record yields a `Persist`.
pub fn handle_process_event(
    runs: &mut [RunRecord],
    in_flight: &mut InFlight,
    run_id: RunId,
    event: ProcessEvent,
) -> Vec<CoreCommand> {
    let Some(record) = runs.iter_mut().find(|r| r.run_id == run_id) else {
        warn!(run_id, ?event, "process event for unknown run; ignoring");
        return Vec::new();
    };

    let mut commands = Vec::new();

    match event {
        ProcessEvent::Started { pid } => {
            debug!(run_id, ?pid, "process started");
        }
        ProcessEvent::Line(line) => {
            record.raw_lines.push(line.clone());
            if let Some(request) = interpret::interpret(record, &line) {
                in_flight.collections.insert(run_id);
                commands.push(CoreCommand::Collect { run_id, request });
            }
            commands.push(CoreCommand::Persist);
        }
        ProcessEvent::Exited { code } => {
            interpret::record_exit(record, code);
            in_flight.processes.remove(&run_id);
            commands.push(CoreCommand::Persist);
        }
        ProcessEvent::Failed { reason } => {
            interpret::mark_failed(record, reason);
            in_flight.processes.remove(&run_id);
            commands.push(CoreCommand::Persist);
        }
    }

    commands
}

/// Handle the end of an artifact collection.
pub fn handle_collection_finished(
    runs: &mut [RunRecord],
    in_flight: &mut InFlight,
    run_id: RunId,
    outcome: CollectionOutcome,
) -> Vec<CoreCommand> {
    in_flight.collections.remove(&run_id);

    let Some(record) = runs.iter_mut().find(|r| r.run_id == run_id) else {
        warn!(run_id, "collection result for unknown run; ignoring");
        return Vec::new();
    };

    interpret::finish_collection(record, outcome);
    vec![CoreCommand::Persist]
}
