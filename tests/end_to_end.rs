// tests/end_to_end.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;

use tempfile::tempdir;

use simrun::engine::RuntimeOptions;
use simrun::record::RunRecord;
use simrun::start_supervisor;
use simrun::store::{JsonFileStore, RunStore};
use simrun::types::{RunId, RunStatus};
use simrun_test_utils::builders::{ConfigFileBuilder, RunRequestBuilder};

type TestResult = Result<(), Box<dyn Error>>;

fn exit_when_idle() -> RuntimeOptions {
    RuntimeOptions {
        exit_when_idle: true,
    }
}

fn load_run(store: &JsonFileStore, run_id: RunId) -> RunRecord {
    store
        .load()
        .unwrap()
        .into_iter()
        .find(|r| r.run_id == run_id)
        .expect("run persisted")
}

#[tokio::test]
async fn echo_snapshot_creates_workspace_and_one_snapshot() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let cfg = ConfigFileBuilder::new().with_root(dir.path()).build();
    let store = JsonFileStore::new(&cfg.store.path);
    let workspace = cfg.run_workspace(1);

    let (handle, join) = start_supervisor(cfg, store.clone(), exit_when_idle())?;
    let accepted = handle
        .submit(RunRequestBuilder::new(r#"echo '{"steps": 1}'"#).steps(10).build())
        .await?;
    assert_eq!(accepted.run_id, 1);

    with_timeout(join).await??;

    assert!(workspace.is_dir());
    let record = load_run(&store, 1);
    assert_eq!(record.status, RunStatus::Running);
    assert_eq!(record.state_history.len(), 1);
    assert_eq!(record.progress(), Some(10.0));
    assert_eq!(record.exit_code, Some(0));
    assert!(record.artifacts.is_empty());
    Ok(())
}

#[tokio::test]
async fn local_simulation_results_are_copied_into_the_workspace() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let sim_dir = dir.path().join("sim");
    fs::create_dir(&sim_dir)?;
    let cfg = ConfigFileBuilder::new()
        .with_root(dir.path())
        .with_working_dir(&sim_dir)
        .build();
    let store = JsonFileStore::new(&cfg.store.path);

    let script = concat!(
        "mkdir -p out && printf 'data\\n' > out/result.csv && ",
        r#"echo '{"steps": 5}' && echo "noise" >&2 && "#,
        r#"echo "Simulation complete: $PWD/out""#,
    );

    let (handle, join) = start_supervisor(cfg, store.clone(), exit_when_idle())?;
    let accepted = handle
        .submit(RunRequestBuilder::new(script).steps(5).build())
        .await?;

    with_timeout(join).await??;

    let record = load_run(&store, accepted.run_id);
    assert_eq!(record.status, RunStatus::Complete, "error: {:?}", record.error);
    assert_eq!(record.artifacts.len(), 1);
    assert_eq!(record.artifacts[0].name, "result.csv");
    assert_eq!(record.artifacts[0].bytes, 5);
    assert_eq!(
        fs::read_to_string(accepted.workspace_path.join("result.csv"))?,
        "data\n"
    );
    assert!(record.raw_lines.iter().any(|l| l.text == "noise"));
    assert_eq!(record.progress(), Some(100.0));
    Ok(())
}

#[tokio::test]
async fn remote_job_results_are_fetched_with_the_copy_command() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let cfg = ConfigFileBuilder::new()
        .with_root(dir.path())
        .with_copy_command("printf '%s' {job_id} > {dest}/job.txt")
        .with_retry_backoff_ms(1)
        .build();
    let store = JsonFileStore::new(&cfg.store.path);

    let (handle, join) = start_supervisor(cfg, store.clone(), exit_when_idle())?;
    let accepted = handle
        .submit(
            RunRequestBuilder::new(r#"echo "Casting spell #7." && echo "Run 7 complete""#)
                .remote()
                .build(),
        )
        .await?;

    with_timeout(join).await??;

    let record = load_run(&store, accepted.run_id);
    assert_eq!(record.status, RunStatus::Complete, "error: {:?}", record.error);
    assert_eq!(record.remote_job_id.as_deref(), Some("7"));
    assert_eq!(
        fs::read_to_string(accepted.workspace_path.join("job.txt"))?,
        "7"
    );
    Ok(())
}

#[tokio::test]
async fn missing_working_directory_fails_the_run() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let cfg = ConfigFileBuilder::new()
        .with_root(dir.path())
        .with_working_dir(dir.path().join("does-not-exist"))
        .build();
    let store = JsonFileStore::new(&cfg.store.path);

    let (handle, join) = start_supervisor(cfg, store.clone(), exit_when_idle())?;
    let accepted = handle.submit(RunRequestBuilder::new("echo hi").build()).await?;

    with_timeout(join).await??;

    let record = load_run(&store, accepted.run_id);
    assert_eq!(record.status, RunStatus::Failed);
    assert!(
        record
            .error
            .as_deref()
            .unwrap()
            .contains("failed to spawn process")
    );
    Ok(())
}

#[tokio::test]
async fn runs_from_earlier_sessions_are_kept() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let cfg = ConfigFileBuilder::new().with_root(dir.path()).build();
    let store = JsonFileStore::new(&cfg.store.path);

    let (handle, join) = start_supervisor(cfg.clone(), store.clone(), exit_when_idle())?;
    handle.submit(RunRequestBuilder::new("true").build()).await?;
    with_timeout(join).await??;

    let (handle, join) = start_supervisor(cfg, store.clone(), exit_when_idle())?;
    let second = handle.submit(RunRequestBuilder::new("true").build()).await?;
    with_timeout(join).await??;

    assert_eq!(second.run_id, 2);
    let ids: Vec<RunId> = store.load()?.iter().map(|r| r.run_id).collect();
    assert_eq!(ids, vec![1, 2]);
    Ok(())
}
