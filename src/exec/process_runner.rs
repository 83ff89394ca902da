// src/exec/process_runner.rs

//! Single process runner.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::exec::line_buffer::LineBuffer;
use crate::record::StreamLine;
use crate::types::StreamTag;

const READ_CHUNK_SIZE: usize = 8192;

/// A command line executed through the platform shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub command: String,
    /// Directory the shell is started in; inherits ours when `None`.
    pub working_dir: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }
}

/// What a running process reports, in order:
/// `Started`, any number of `Line`s, then `Exited`.
///
/// `Failed` is emitted by the backend instead of (or after) the normal
/// sequence when the process could not be spawned or awaited.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// The process handle exists.
    Started { pid: Option<u32> },
    /// One line of output. Lines of a stream arrive in order; stdout and
    /// stderr lines are not ordered relative to each other.
    Line(StreamLine),
    /// The process exited after both streams were drained.
    Exited { code: Option<i32> },
    Failed { reason: String },
}

/// Build a shell command appropriate for the platform.
pub fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Run `command` to completion, streaming its output as [`ProcessEvent`]s.
///
/// Returns an error if the process could not be spawned or awaited; in that
/// case no `Exited` event is sent.
pub async fn run_process(command: &ShellCommand, events: mpsc::Sender<ProcessEvent>) -> Result<()> {
    info!(cmd = %command.command, dir = ?command.working_dir, "starting process");

    let mut cmd = shell_command(&command.command);
    if let Some(dir) = &command.working_dir {
        cmd.current_dir(dir);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process '{}'", command.command))?;

    events
        .send(ProcessEvent::Started { pid: child.id() })
        .await
        .context("sending Started event")?;

    let stdout_task = child
        .stdout
        .take()
        .map(|out| tokio::spawn(forward_lines(out, StreamTag::Normal, events.clone())));
    let stderr_task = child
        .stderr
        .take()
        .map(|err| tokio::spawn(forward_lines(err, StreamTag::Error, events.clone())));

    // Drain both streams before reporting exit so every line is delivered
    // ahead of `Exited`.
    for task in [stdout_task, stderr_task].into_iter().flatten() {
        if let Err(e) = task.await {
            warn!(error = %e, "output reader task failed");
        }
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process '{}'", command.command))?;

    info!(
        cmd = %command.command,
        exit_code = ?status.code(),
        success = status.success(),
        "process exited"
    );

    events
        .send(ProcessEvent::Exited {
            code: status.code(),
        })
        .await
        .context("sending Exited event")?;

    Ok(())
}

/// Read `reader` to EOF in chunks and emit one `Line` event per line.
pub async fn forward_lines<R>(mut reader: R, tag: StreamTag, events: mpsc::Sender<ProcessEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut buffer = LineBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(?tag, error = %e, "reading process output failed");
                break;
            }
        };

        for text in buffer.push(&chunk[..n]) {
            if !send_line(&events, text, tag).await {
                return;
            }
        }
    }

    if let Some(text) = buffer.finish() {
        send_line(&events, text, tag).await;
    }
}

async fn send_line(events: &mpsc::Sender<ProcessEvent>, text: String, tag: StreamTag) -> bool {
    debug!(?tag, "output: {}", text);
    if events
        .send(ProcessEvent::Line(StreamLine { text, tag }))
        .await
        .is_err()
    {
        debug!(?tag, "event receiver closed; stopping output reader");
        return false;
    }
    true
}
