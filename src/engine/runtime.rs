// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, trace, warn};

use crate::collect::ArtifactCollector;
use crate::config::ConfigFile;
use crate::errors::{Result, SimrunError};
use crate::exec::{ProcessBackend, ProcessEvent, ShellCommand};
use crate::fs::FileSystem;
use crate::interpret::{CollectionOutcome, CollectionRequest};
use crate::record::{RunRecord, RunRequest};
use crate::store::RunStore;
use crate::types::RunId;

use super::core::CoreRuntime;
use super::{CoreCommand, CoreStep, RuntimeEvent};

const PERSIST_ATTEMPTS: u32 = 3;
const PERSIST_BACKOFF: Duration = Duration::from_millis(50);

/// Where runs live on disk and how commands are started.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    pub config: ConfigFile,
    pub fs: Arc<dyn FileSystem>,
}

/// Drives the run records in response to `RuntimeEvent`s.
///
/// This is the IO shell around `CoreRuntime`: it owns the store (and is its
/// only writer), creates workspaces, starts processes through the
/// `ProcessBackend` and runs collections through the `ArtifactCollector`.
/// Every event is handled to completion before the next one is read, so
/// records are never mutated concurrently.
pub struct Runtime<P: ProcessBackend, C: ArtifactCollector, S: RunStore> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::WeakSender<RuntimeEvent>,
    processes: P,
    collector: Arc<C>,
    store: S,
    ctx: RuntimeContext,
}

impl<P: ProcessBackend, C: ArtifactCollector, S: RunStore> fmt::Debug for Runtime<P, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

/// The store is cloned into the blocking pool for every save, so clones must
/// share the same underlying storage (`JsonFileStore`, `MemoryStore` do).
impl<P, C, S> Runtime<P, C, S>
where
    P: ProcessBackend,
    C: ArtifactCollector,
    S: RunStore + Clone + 'static,
{
    /// `event_tx` is the sending side of `event_rx`; collection tasks use it
    /// to report back.
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::WeakSender<RuntimeEvent>,
        processes: P,
        collector: Arc<C>,
        store: S,
        ctx: RuntimeContext,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            processes,
            collector,
            store,
            ctx,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Handles submissions (workspace + record) and feeds everything else
    ///   into the core.
    /// - Executes commands returned by the core (persist, start, collect).
    pub async fn run(mut self) -> Result<()> {
        info!(runs = self.core.runs().len(), "simrun supervisor started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            trace!(?event, "runtime received event");

            let step = match event {
                RuntimeEvent::Submit { request, reply } => self.handle_submit(request, reply),
                other => self.core.step(other),
            };

            let keep_running = self.execute_commands(step.commands).await;

            if !(step.keep_running && keep_running) {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    fn handle_submit(
        &mut self,
        request: RunRequest,
        reply: oneshot::Sender<Result<RunRecord>>,
    ) -> CoreStep {
        match self.prepare_run(request) {
            Ok(record) => {
                let step = self.core.accept(record.clone());
                if reply.send(Ok(record)).is_err() {
                    debug!("submitter went away before the run was accepted");
                }
                step
            }
            Err(err) => {
                warn!(error = %err, "run submission rejected");
                let _ = reply.send(Err(err));
                self.core.settle()
            }
        }
    }

    /// Assign the id and create the workspace for a new run.
    fn prepare_run(&mut self, request: RunRequest) -> Result<RunRecord> {
        let run_id = match request.run_id {
            Some(id) => id,
            None => self.store.next_run_id()?,
        };
        let workspace = self.ctx.config.run_workspace(run_id);

        if self.core.contains(run_id) {
            return Err(SimrunError::WorkspaceCreation {
                path: workspace.display().to_string(),
                reason: format!("run {run_id} already exists"),
            });
        }

        self.ctx
            .fs
            .create_dir_all(&self.ctx.config.project_dir())
            .and_then(|()| self.ctx.fs.create_dir(&workspace))
            .map_err(|e| SimrunError::WorkspaceCreation {
                path: workspace.display().to_string(),
                reason: format!("{e:#}"),
            })?;

        info!(run_id, workspace = %workspace.display(), "workspace created");
        Ok(RunRecord::new(run_id, request, workspace))
    }

    /// Execute commands from the core, including follow-up commands that
    /// executing them produces. Returns `false` if a follow-up step asked
    /// the runtime to stop.
    async fn execute_commands(&mut self, commands: Vec<CoreCommand>) -> bool {
        let mut queue: VecDeque<CoreCommand> = commands.into();
        let mut keep_running = true;

        while let Some(command) = queue.pop_front() {
            match command {
                CoreCommand::Persist => self.persist().await,
                CoreCommand::StartProcess { run_id, command } => {
                    if let Some(step) = self.start_process(run_id, command).await {
                        keep_running &= step.keep_running;
                        queue.extend(step.commands);
                    }
                }
                CoreCommand::Collect { run_id, request } => {
                    if let Some(step) = self.collect(run_id, request).await {
                        keep_running &= step.keep_running;
                        queue.extend(step.commands);
                    }
                }
                CoreCommand::RequestExit => {
                    info!("core issued RequestExit command");
                }
            }
        }

        keep_running
    }

    async fn start_process(&mut self, run_id: RunId, command: String) -> Option<CoreStep> {
        let shell =
            ShellCommand::new(command).in_dir(self.ctx.config.simulation.working_dir.clone());

        match self.processes.start(run_id, shell).await {
            Ok(()) => None,
            Err(err) => {
                let reason = SimrunError::ProcessSpawn {
                    run_id,
                    reason: err.to_string(),
                }
                .to_string();
                error!(run_id, error = %reason, "could not start process");
                Some(self.core.step(RuntimeEvent::Process {
                    run_id,
                    event: ProcessEvent::Failed { reason },
                }))
            }
        }
    }

    /// Run a collection in the background and report it as
    /// `CollectionFinished`. Without a live sender the collection is awaited
    /// here and applied directly.
    async fn collect(&mut self, run_id: RunId, request: CollectionRequest) -> Option<CoreStep> {
        let collector = Arc::clone(&self.collector);

        match self.event_tx.upgrade() {
            Some(tx) => {
                tokio::spawn(async move {
                    let outcome = run_collection(collector.as_ref(), request).await;
                    if tx
                        .send(RuntimeEvent::CollectionFinished { run_id, outcome })
                        .await
                        .is_err()
                    {
                        debug!(run_id, "runtime gone; dropping collection result");
                    }
                });
                None
            }
            None => {
                let outcome = run_collection(collector.as_ref(), request).await;
                Some(
                    self.core
                        .step(RuntimeEvent::CollectionFinished { run_id, outcome }),
                )
            }
        }
    }

    /// Save the whole collection, retrying with exponential backoff (50 ms,
    /// then 100 ms). The write runs on the blocking pool; the loop waits
    /// for it, so saves land in event order. After the last attempt the
    /// error is logged and the in-memory records stay authoritative; the
    /// next update saves everything again.
    async fn persist(&mut self) {
        for attempt in 1..=PERSIST_ATTEMPTS {
            let result = save_blocking(self.store.clone(), self.core.runs().to_vec()).await;
            match result {
                Ok(()) => return,
                Err(err) => {
                    warn!(attempt, error = %err, "persisting run collection failed");
                    if attempt < PERSIST_ATTEMPTS {
                        tokio::time::sleep(PERSIST_BACKOFF * 2u32.pow(attempt - 1)).await;
                    }
                }
            }
        }
        error!(
            attempts = PERSIST_ATTEMPTS,
            "giving up persisting run collection until the next update"
        );
    }
}

async fn save_blocking<S: RunStore + 'static>(mut store: S, runs: Vec<RunRecord>) -> Result<()> {
    tokio::task::spawn_blocking(move || store.save_all(&runs))
        .await
        .map_err(|e| SimrunError::Persistence(format!("store task failed: {e}")))?
}

async fn run_collection<C: ArtifactCollector>(
    collector: &C,
    request: CollectionRequest,
) -> CollectionOutcome {
    let result = match request {
        CollectionRequest::Local { source, dest } => collector.collect_local(source, dest).await,
        CollectionRequest::Remote { job_id, dest } => collector
            .collect_remote(job_id, dest)
            .await
            .map(|()| Vec::new()),
    };
    result.map_err(|e| e.to_string())
}
