// src/engine/handle.rs

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};

use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::record::{RunRecord, RunRequest};

/// Cloneable submission API for a running supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    tx: mpsc::Sender<RuntimeEvent>,
}

impl SupervisorHandle {
    pub fn new(tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { tx }
    }

    /// Submit a run and wait until it is accepted.
    ///
    /// Returns as soon as the workspace exists and the process was asked to
    /// start; the process itself runs in the background. Fails with
    /// `WorkspaceCreation` if the workspace could not be created.
    pub async fn submit(&self, request: RunRequest) -> Result<RunRecord> {
        let (reply, reply_rx) = oneshot::channel();
        self.tx
            .send(RuntimeEvent::Submit { request, reply })
            .await
            .map_err(|_| anyhow!("supervisor is not running"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("supervisor stopped before accepting the run"))?
    }

    /// Ask the runtime loop to stop. Running processes are killed when the
    /// runtime drops them.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(RuntimeEvent::ShutdownRequested)
            .await
            .map_err(|_| anyhow!("supervisor is not running"))?;
        Ok(())
    }
}
