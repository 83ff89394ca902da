// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The runtime talks to a `ProcessBackend` instead of spawning processes
//! itself. This makes it easy to swap in a scripted fake in tests while
//! keeping the production implementation in [`process_runner`].
//!
//! [`process_runner`]: crate::exec::process_runner

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::engine::RuntimeEvent;
use crate::errors::{Result, SimrunError};
use crate::exec::process_runner::{ProcessEvent, ShellCommand, run_process};
use crate::types::RunId;

/// Trait abstracting how run processes are started.
///
/// Implementations report everything that happens to the process back to
/// the runtime as `RuntimeEvent::Process` events tagged with `run_id`.
/// `start` must not wait for the process to finish.
pub trait ProcessBackend: Send {
    fn start(
        &mut self,
        run_id: RunId,
        command: ShellCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: one Tokio task per run process.
pub struct RealProcessBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealProcessBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { runtime_tx }
    }
}

impl ProcessBackend for RealProcessBackend {
    fn start(
        &mut self,
        run_id: RunId,
        command: ShellCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let runtime_tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(supervise_process(run_id, command, runtime_tx));
            Ok(())
        })
    }
}

/// Run one process and forward its events to the runtime.
async fn supervise_process(
    run_id: RunId,
    command: ShellCommand,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let (tx, mut rx) = mpsc::channel::<ProcessEvent>(256);

    let forward_tx = runtime_tx.clone();
    let forwarder = tokio::spawn(async move {
        let mut started = false;
        while let Some(event) = rx.recv().await {
            started |= matches!(event, ProcessEvent::Started { .. });
            if forward_tx
                .send(RuntimeEvent::Process { run_id, event })
                .await
                .is_err()
            {
                debug!(run_id, "runtime gone; dropping process events");
                break;
            }
        }
        started
    });

    let result = run_process(&command, tx).await;
    let started = forwarder.await.unwrap_or(false);

    if let Err(err) = result {
        let reason = if started {
            format!("process error: {err:#}")
        } else {
            SimrunError::ProcessSpawn {
                run_id,
                reason: format!("{err:#}"),
            }
            .to_string()
        };
        error!(run_id, error = %reason, "process execution error");
        let _ = runtime_tx
            .send(RuntimeEvent::Process {
                run_id,
                event: ProcessEvent::Failed { reason },
            })
            .await;
    }
}
