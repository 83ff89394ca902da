// src/collect/mod.rs

//! Artifact collection after a run reached its terminal marker.
//!
//! - [`local`] copies the files a local run reported into its workspace.
//! - [`remote`] runs the remote copy command, with retries.
//!
//! The runtime only sees the [`ArtifactCollector`] trait; tests provide a
//! recording fake.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::RemoteSection;
use crate::errors::{Result, SimrunError};
use crate::fs::FileSystem;
use crate::record::ArtifactEntry;

pub mod local;
pub mod remote;

pub use local::{artifact_digest, collect_local};
pub use remote::RemoteCopier;

/// Boxed future returned by collectors.
pub type CollectFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// How artifacts get into a run's workspace.
pub trait ArtifactCollector: Send + Sync + 'static {
    /// Copy every file in `source` into `dest`, stopping at the first failure.
    fn collect_local(&self, source: PathBuf, dest: PathBuf) -> CollectFuture<'_, Vec<ArtifactEntry>>;

    /// Fetch the output of remote job `job_id` into `dest`.
    fn collect_remote(&self, job_id: String, dest: PathBuf) -> CollectFuture<'_, ()>;
}

/// Production collector: local copies through a [`FileSystem`], remote
/// copies through the configured shell command.
#[derive(Debug, Clone)]
pub struct FsArtifactCollector {
    fs: Arc<dyn FileSystem>,
    remote: RemoteCopier,
}

impl FsArtifactCollector {
    pub fn new(fs: Arc<dyn FileSystem>, remote: RemoteSection) -> Self {
        Self {
            fs,
            remote: RemoteCopier::new(remote),
        }
    }
}

impl ArtifactCollector for FsArtifactCollector {
    fn collect_local(&self, source: PathBuf, dest: PathBuf) -> CollectFuture<'_, Vec<ArtifactEntry>> {
        let fs = Arc::clone(&self.fs);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || collect_local(fs.as_ref(), &source, &dest))
                .await
                .map_err(|e| SimrunError::Collection(format!("copy task panicked: {e}")))?
        })
    }

    fn collect_remote(&self, job_id: String, dest: PathBuf) -> CollectFuture<'_, ()> {
        Box::pin(async move { self.remote.copy(&job_id, &dest).await })
    }
}
