use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::mpsc;
use simrun::engine::RuntimeEvent;
use simrun::errors::Result;
use simrun::exec::{ProcessBackend, ProcessEvent, ShellCommand};
use simrun::record::StreamLine;
use simrun::types::RunId;

/// What a scripted process prints before it exits.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub lines: Vec<StreamLine>,
    pub exit_code: Option<i32>,
}

impl Script {
    /// stdout lines followed by exit code 0.
    pub fn stdout<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(StreamLine::normal).collect(),
            exit_code: Some(0),
        }
    }

    pub fn with_line(mut self, line: StreamLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

/// A fake process backend that:
/// - records which runs were started and with what command
/// - replays the script registered for the command as `Process` events
/// - refuses to start commands registered with `fail_start`.
///
/// Commands without a script print nothing and exit with 0.
pub struct ScriptedProcessBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    scripts: HashMap<String, Script>,
    failing: HashMap<String, String>,
    started: Arc<Mutex<Vec<(RunId, ShellCommand)>>>,
}

impl ScriptedProcessBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            runtime_tx,
            scripts: HashMap::new(),
            failing: HashMap::new(),
            started: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_script(mut self, command: &str, script: Script) -> Self {
        self.scripts.insert(command.to_string(), script);
        self
    }

    pub fn fail_start(mut self, command: &str, reason: &str) -> Self {
        self.failing.insert(command.to_string(), reason.to_string());
        self
    }

    /// Shared log of started runs; stays readable after the backend moved
    /// into the runtime.
    pub fn started(&self) -> Arc<Mutex<Vec<(RunId, ShellCommand)>>> {
        Arc::clone(&self.started)
    }
}

impl ProcessBackend for ScriptedProcessBackend {
    fn start(
        &mut self,
        run_id: RunId,
        command: ShellCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let started = Arc::clone(&self.started);
        let failure = self.failing.get(&command.command).cloned();
        let script = self
            .scripts
            .get(&command.command)
            .cloned()
            .unwrap_or_else(|| Script::stdout(Vec::<String>::new()));

        Box::pin(async move {
            if let Some(reason) = failure {
                return Err(anyhow!(reason).into());
            }

            started.lock().unwrap().push((run_id, command));

            // Replay from a separate task: the runtime is busy awaiting us.
            tokio::spawn(async move {
                let mut events = vec![ProcessEvent::Started { pid: None }];
                events.extend(script.lines.into_iter().map(ProcessEvent::Line));
                events.push(ProcessEvent::Exited {
                    code: script.exit_code,
                });

                for event in events {
                    if tx.send(RuntimeEvent::Process { run_id, event }).await.is_err() {
                        break;
                    }
                }
            });
            Ok(())
        })
    }
}
