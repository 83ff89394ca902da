// src/collect/remote.rs

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::RemoteSection;
use crate::errors::{Result, SimrunError};
use crate::exec::shell_command;

/// Runs the remote copy command for finished remote jobs.
///
/// Each attempt runs the rendered `copy_command` through the shell and waits
/// for it. Output is only logged. A non-zero exit or a spawn failure is
/// retried up to `copy_attempts` times in total, sleeping
/// `attempt * retry_backoff_ms` between attempts.
#[derive(Debug, Clone)]
pub struct RemoteCopier {
    settings: RemoteSection,
}

impl RemoteCopier {
    pub fn new(settings: RemoteSection) -> Self {
        Self { settings }
    }

    pub async fn copy(&self, job_id: &str, dest: &Path) -> Result<()> {
        let command = self.settings.render_copy_command(job_id, dest)?;
        let attempts = self.settings.copy_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            info!(job_id, attempt, cmd = %command, "running remote copy");
            match run_once(&command).await {
                Ok(()) => {
                    info!(job_id, dest = %dest.display(), "remote artifacts copied");
                    return Ok(());
                }
                Err(reason) => {
                    warn!(job_id, attempt, reason = %reason, "remote copy failed");
                    last_error = reason;
                }
            }

            if attempt < attempts {
                let backoff = self.settings.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
        }

        Err(SimrunError::Collection(format!(
            "remote copy for job {job_id} failed after {attempts} attempt(s): {last_error}"
        )))
    }
}

async fn run_once(command: &str) -> std::result::Result<(), String> {
    let output = shell_command(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| format!("spawning '{command}': {e}"))?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!("remote copy stdout: {}", line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        debug!("remote copy stderr: {}", line);
    }

    if output.status.success() {
        Ok(())
    } else {
        Err(format!("'{command}' exited with {}", output.status))
    }
}
