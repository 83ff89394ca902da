// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - updated run records
//! - a list of "commands" describing what the IO shell should do next
//!   (persist, start a process, collect artifacts, exit)
//!
//! The core has no channels, no Tokio types and performs no IO, so the whole
//! line-to-state pipeline can be tested by feeding it events.

use tracing::{debug, info};

use crate::engine::event_handlers::{
    CoreCommand, CoreStep, InFlight, handle_collection_finished, handle_process_event,
};
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::record::RunRecord;
use crate::types::RunId;

#[derive(Debug)]
pub struct CoreRuntime {
    runs: Vec<RunRecord>,
    in_flight: InFlight,
    options: RuntimeOptions,
}

impl CoreRuntime {
    /// Start from the previously persisted collection. Records loaded here
    /// have no live process attached.
    pub fn new(runs: Vec<RunRecord>, options: RuntimeOptions) -> Self {
        Self {
            runs,
            in_flight: InFlight::default(),
            options,
        }
    }

    /// All records, in submission order.
    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    pub fn run(&self, run_id: RunId) -> Option<&RunRecord> {
        self.runs.iter().find(|r| r.run_id == run_id)
    }

    pub fn contains(&self, run_id: RunId) -> bool {
        self.run(run_id).is_some()
    }

    /// No process running and no collection pending.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Register a freshly created record and ask for its process.
    ///
    /// The record's workspace must already exist.
    pub fn accept(&mut self, record: RunRecord) -> CoreStep {
        let run_id = record.run_id;
        let command = record.command.clone();
        info!(run_id, cmd = %command, platform = %record.platform, "run accepted");

        self.runs.push(record);
        self.in_flight.processes.insert(run_id);

        CoreStep::running(vec![
            CoreCommand::Persist,
            CoreCommand::StartProcess { run_id, command },
        ])
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    ///
    /// `Submit` needs IO (workspace creation, id assignment) and is handled
    /// by the shell, which then calls [`CoreRuntime::accept`].
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let commands = match event {
            RuntimeEvent::Process { run_id, event } => {
                handle_process_event(&mut self.runs, &mut self.in_flight, run_id, event)
            }
            RuntimeEvent::CollectionFinished { run_id, outcome } => {
                handle_collection_finished(&mut self.runs, &mut self.in_flight, run_id, outcome)
            }
            RuntimeEvent::Submit { request, .. } => {
                debug!(?request, "submit reached the core directly; ignoring");
                Vec::new()
            }
            RuntimeEvent::ShutdownRequested => {
                return CoreStep {
                    commands: Vec::new(),
                    keep_running: false,
                };
            }
        };

        self.finish_step(commands)
    }

    /// Step without an event, used after a rejected submission.
    pub fn settle(&self) -> CoreStep {
        self.finish_step(Vec::new())
    }

    fn finish_step(&self, mut commands: Vec<CoreCommand>) -> CoreStep {
        if self.options.exit_when_idle && self.is_idle() {
            commands.push(CoreCommand::RequestExit);
            return CoreStep {
                commands,
                keep_running: false,
            };
        }
        CoreStep::running(commands)
    }
}
