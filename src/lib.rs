// src/lib.rs

pub mod cli;
pub mod collect;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod interpret;
pub mod logging;
pub mod record;
pub mod store;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cli::{CliArgs, Command, RunArgs};
use crate::collect::FsArtifactCollector;
use crate::config::{ConfigFile, load_and_validate};
use crate::engine::{
    CoreRuntime, Runtime, RuntimeContext, RuntimeEvent, RuntimeOptions, SupervisorHandle,
};
use crate::errors::SimrunError;
use crate::exec::RealProcessBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::record::{RunRecord, RunRequest, StartParameters};
use crate::store::{JsonFileStore, RunStore};
use crate::types::{RunId, RunStatus};

/// Start a supervisor on the current Tokio runtime.
///
/// Previously persisted runs are loaded from `store` and kept in the
/// collection, but no process is attached to them. The returned handle
/// submits new runs; the join handle resolves when the runtime loop exits.
pub fn start_supervisor<S: RunStore + Clone + 'static>(
    config: ConfigFile,
    store: S,
    options: RuntimeOptions,
) -> errors::Result<(SupervisorHandle, JoinHandle<errors::Result<()>>)> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let runs = store.load()?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(256);

    let processes = RealProcessBackend::new(rt_tx.clone());
    let collector = Arc::new(FsArtifactCollector::new(
        Arc::clone(&fs),
        config.remote.clone(),
    ));

    let core = CoreRuntime::new(runs, options);
    let runtime = Runtime::new(
        core,
        rt_rx,
        rt_tx.downgrade(),
        processes,
        collector,
        store,
        RuntimeContext { config, fs },
    );

    let join = tokio::spawn(runtime.run());
    Ok((SupervisorHandle::new(rt_tx), join))
}

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    match args.command {
        Command::Run(run_args) => run_simulation(cfg, run_args).await,
        Command::List => list_runs(&cfg),
        Command::Show { run_id, lines } => show_run(&cfg, run_id, lines),
        Command::NextId => {
            let mut store = JsonFileStore::new(&cfg.store.path);
            let run_id = store.next_run_id()?;
            println!("{run_id}");
            Ok(())
        }
    }
}

/// Submit one run and supervise it until nothing is left in flight.
async fn run_simulation(cfg: ConfigFile, args: RunArgs) -> Result<()> {
    let store = JsonFileStore::new(&cfg.store.path);
    let options = RuntimeOptions {
        exit_when_idle: true,
    };
    let (handle, join) = start_supervisor(cfg, store.clone(), options)?;

    // Ctrl-C → graceful shutdown.
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            if let Err(e) = handle.shutdown().await {
                warn!(error = %e, "could not request shutdown");
            }
        });
    }

    let request = RunRequest {
        command: args.command,
        run_id: args.run_id,
        start_parameters: StartParameters {
            steps: args.steps,
            platform: args.platform,
            version: args.sim_version,
            data_points: args.data_points,
            ..StartParameters::default()
        },
    };

    let accepted = handle.submit(request).await?;
    info!(
        run_id = accepted.run_id,
        workspace = %accepted.workspace_path.display(),
        "run submitted"
    );

    join.await??;

    let record = find_run(&store, accepted.run_id)?;
    print_summary(&record);

    match record.status {
        RunStatus::Failed => Err(anyhow!(
            "run {} failed: {}",
            record.run_id,
            record.error.as_deref().unwrap_or("unknown error")
        )),
        _ => Ok(()),
    }
}

fn list_runs(cfg: &ConfigFile) -> Result<()> {
    let runs = JsonFileStore::new(&cfg.store.path).load()?;
    if runs.is_empty() {
        println!("no runs recorded");
        return Ok(());
    }

    println!(
        "{:<6} {:<11} {:>8} {:<8} WORKSPACE",
        "ID", "STATUS", "PROGRESS", "PLATFORM"
    );
    for run in &runs {
        let progress = run
            .progress()
            .map(|p| format!("{p:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<11} {:>8} {:<8} {}",
            run.run_id,
            run.status,
            progress,
            run.platform,
            run.workspace_path.display()
        );
    }
    Ok(())
}

fn show_run(cfg: &ConfigFile, run_id: RunId, lines: bool) -> Result<()> {
    let store = JsonFileStore::new(&cfg.store.path);
    let mut record = find_run(&store, run_id)?;
    if !lines {
        record.raw_lines.clear();
    }
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn find_run(store: &impl RunStore, run_id: RunId) -> errors::Result<RunRecord> {
    store
        .load()?
        .into_iter()
        .find(|r| r.run_id == run_id)
        .ok_or(SimrunError::RunNotFound(run_id))
}

fn print_summary(record: &RunRecord) {
    println!("run {}: {}", record.run_id, record.status);
    println!("  workspace: {}", record.workspace_path.display());
    if let Some(progress) = record.progress() {
        println!("  progress: {progress:.1}%");
    }
    if let Some(job_id) = &record.remote_job_id {
        println!("  remote job: {job_id}");
    }
    if let Some(code) = record.exit_code {
        println!("  exit code: {code}");
    }
    if !record.artifacts.is_empty() {
        println!("  artifacts ({}):", record.artifacts.len());
        for artifact in &record.artifacts {
            println!("    {} ({} bytes)", artifact.name, artifact.bytes);
        }
    }
    if let Some(error) = &record.error {
        println!("  error: {error}");
    }
}
