// tests/store.rs

mod common;
use crate::common::{local_record, remote_record};

use std::error::Error;
use std::fs;

use serde_json::json;
use tempfile::tempdir;

use simrun::errors::SimrunError;
use simrun::record::StreamLine;
use simrun::store::{JsonFileStore, KeyValueStore, MemoryStore, RUN_ID_KEY, RUNS_KEY, RunStore};
use simrun::types::RunStatus;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn next_run_id_is_monotonic() -> TestResult {
    let mut store = MemoryStore::new();
    assert_eq!(store.next_run_id()?, 1);
    assert_eq!(store.next_run_id()?, 2);
    assert_eq!(store.next_run_id()?, 3);
    assert_eq!(store.get(RUN_ID_KEY, json!(0))?, json!(3));
    Ok(())
}

#[test]
fn unreadable_counter_is_an_error_not_a_restart() -> TestResult {
    for bad in [json!("12"), json!(-3), json!(2.5), json!(null)] {
        let mut store = MemoryStore::new();
        store.set(RUN_ID_KEY, bad.clone())?;

        match store.next_run_id() {
            Err(SimrunError::Persistence(msg)) => assert!(msg.contains("run id counter")),
            other => panic!("counter {bad} should be rejected, got {other:?}"),
        }
        assert_eq!(store.get(RUN_ID_KEY, json!(0))?, bad);
    }
    Ok(())
}

#[test]
fn counter_overflow_is_an_error() -> TestResult {
    let mut store = MemoryStore::new();
    store.set(RUN_ID_KEY, json!(u64::MAX))?;

    assert!(matches!(
        store.next_run_id(),
        Err(SimrunError::Persistence(_))
    ));
    Ok(())
}

#[test]
fn empty_store_loads_no_runs() -> TestResult {
    let store = MemoryStore::new();
    assert!(store.load()?.is_empty());
    Ok(())
}

#[test]
fn saving_the_same_collection_twice_is_idempotent() -> TestResult {
    let mut store = MemoryStore::new();
    let mut record = local_record(1, 10);
    record.raw_lines.push(StreamLine::normal("hello"));
    let runs = vec![record, remote_record(2)];

    store.save_all(&runs)?;
    let first = store.get(RUNS_KEY, json!([]))?;
    store.save_all(&runs)?;
    let second = store.get(RUNS_KEY, json!([]))?;

    assert_eq!(first, second);
    assert_eq!(store.load()?, runs);
    assert_eq!(store.set_count(), 2);
    Ok(())
}

#[test]
fn saving_runs_does_not_touch_the_counter() -> TestResult {
    let mut store = MemoryStore::new();
    assert_eq!(store.next_run_id()?, 1);
    store.save_all(&[local_record(1, 10)])?;
    assert_eq!(store.next_run_id()?, 2);
    Ok(())
}

#[test]
fn json_file_store_missing_file_reads_as_empty() -> TestResult {
    let dir = tempdir()?;
    let mut store = JsonFileStore::new(dir.path().join("store.json"));

    assert!(store.load()?.is_empty());
    assert_eq!(store.next_run_id()?, 1);
    Ok(())
}

#[test]
fn json_file_store_survives_reopen() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("store.json");

    let mut record = remote_record(7);
    record.remote_job_id = Some("42".to_string());
    record.status = RunStatus::CollectingArtifacts;

    {
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.next_run_id()?, 1);
        store.save_all(&[record.clone()])?;
    }

    let mut reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.load()?, vec![record]);
    assert_eq!(reopened.next_run_id()?, 2);

    let names: Vec<String> = fs::read_dir(dir.path().join("nested"))?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    assert_eq!(names, vec!["store.json".to_string()]);
    Ok(())
}

#[test]
fn json_file_store_keeps_unrelated_keys() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("store.json");
    fs::write(&path, r#"{"window": {"width": 800}}"#)?;

    let mut store = JsonFileStore::new(&path);
    store.save_all(&[local_record(1, 10)])?;

    assert_eq!(store.get("window", json!(null))?, json!({"width": 800}));
    assert_eq!(store.load()?.len(), 1);
    Ok(())
}

#[test]
fn json_file_store_rejects_non_object_document() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("store.json");
    fs::write(&path, "[1, 2, 3]")?;

    let store = JsonFileStore::new(&path);
    match store.load() {
        Err(SimrunError::Persistence(msg)) => assert!(msg.contains("JSON object")),
        other => panic!("expected persistence error, got {other:?}"),
    }
    Ok(())
}
