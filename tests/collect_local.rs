// tests/collect_local.rs

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::tempdir;

use simrun::collect::{ArtifactCollector, FsArtifactCollector, collect_local};
use simrun::config::RemoteSection;
use simrun::errors::SimrunError;
use simrun::fs::mock::MockFileSystem;
use simrun::fs::{FileSystem, RealFileSystem};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn copies_every_file_into_the_workspace() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("results");
    let dest = dir.path().join("run_1");
    fs::create_dir_all(source.join("nested"))?;
    fs::create_dir(&dest)?;
    fs::write(source.join("b.txt"), "beta")?;
    fs::write(source.join("a.txt"), "alpha")?;
    fs::write(source.join("nested").join("skip.txt"), "skipped")?;

    let artifacts = collect_local(&RealFileSystem, &source, &dest)?;

    let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(artifacts[0].bytes, 5);
    assert_eq!(artifacts[1].bytes, 4);
    assert_eq!(artifacts[0].blake3, blake3::hash(b"alpha").to_hex().to_string());

    assert_eq!(fs::read_to_string(dest.join("a.txt"))?, "alpha");
    assert_eq!(fs::read_to_string(dest.join("b.txt"))?, "beta");
    assert!(!dest.join("nested").exists());
    assert!(!dest.join("skip.txt").exists());
    Ok(())
}

#[test]
fn missing_workspace_is_a_collection_error() -> TestResult {
    let dir = tempdir()?;
    let source = dir.path().join("results");
    fs::create_dir(&source)?;
    fs::write(source.join("a.txt"), "alpha")?;

    let result = collect_local(&RealFileSystem, &source, &dir.path().join("gone"));
    assert!(matches!(result, Err(SimrunError::Collection(_))));
    Ok(())
}

#[test]
fn missing_source_is_a_collection_error() {
    let fs = MockFileSystem::new();
    fs.add_dir("/ws/run_1");

    let result = collect_local(&fs, Path::new("/nowhere"), Path::new("/ws/run_1"));
    assert!(matches!(result, Err(SimrunError::Collection(_))));
}

#[test]
fn first_failed_copy_aborts_the_rest() {
    let fs = MockFileSystem::new();
    fs.add_file("/out/a.txt", "alpha");
    fs.add_file("/out/b.txt", "beta");
    fs.add_file("/out/c.txt", "gamma");
    fs.add_dir("/ws/run_1");
    fs.fail_copies_of("b.txt");

    let result = collect_local(&fs, Path::new("/out"), Path::new("/ws/run_1"));

    match result {
        Err(SimrunError::Collection(msg)) => assert!(msg.contains("b.txt")),
        other => panic!("expected collection error, got {other:?}"),
    }
    assert_eq!(fs.file_contents("/ws/run_1/a.txt"), Some(b"alpha".to_vec()));
    assert_eq!(fs.file_contents("/ws/run_1/b.txt"), None);
    assert_eq!(fs.file_contents("/ws/run_1/c.txt"), None);
}

#[tokio::test]
async fn fs_collector_runs_local_copies_through_the_filesystem() -> TestResult {
    let mock = MockFileSystem::new();
    mock.add_file("/out/graph.csv", "t,agents\n0,10\n");
    mock.add_dir("/ws/run_2");

    let fs: Arc<dyn FileSystem> = Arc::new(mock.clone());
    let collector = FsArtifactCollector::new(fs, RemoteSection::default());

    let artifacts = collector
        .collect_local(PathBuf::from("/out"), PathBuf::from("/ws/run_2"))
        .await?;

    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].name, "graph.csv");
    assert_eq!(
        mock.file_contents("/ws/run_2/graph.csv"),
        Some(b"t,agents\n0,10\n".to_vec())
    );
    Ok(())
}
