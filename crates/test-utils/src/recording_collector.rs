use std::path::PathBuf;
use std::sync::Mutex;

use simrun::collect::{ArtifactCollector, CollectFuture};
use simrun::errors::SimrunError;
use simrun::record::ArtifactEntry;

/// One call made to the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectCall {
    Local { source: PathBuf, dest: PathBuf },
    Remote { job_id: String, dest: PathBuf },
}

/// Collector that records calls instead of copying anything.
///
/// Every call succeeds with the configured artifacts unless a failure
/// reason was set.
#[derive(Debug, Default)]
pub struct RecordingCollector {
    calls: Mutex<Vec<CollectCall>>,
    artifacts: Vec<ArtifactEntry>,
    failure: Option<String>,
}

impl RecordingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifacts(mut self, artifacts: Vec<ArtifactEntry>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CollectCall> {
        self.calls.lock().unwrap().clone()
    }

    fn outcome(&self) -> Result<(), SimrunError> {
        match &self.failure {
            Some(reason) => Err(SimrunError::Collection(reason.clone())),
            None => Ok(()),
        }
    }
}

impl ArtifactCollector for RecordingCollector {
    fn collect_local(&self, source: PathBuf, dest: PathBuf) -> CollectFuture<'_, Vec<ArtifactEntry>> {
        self.calls
            .lock()
            .unwrap()
            .push(CollectCall::Local { source, dest });
        let result = self.outcome().map(|()| self.artifacts.clone());
        Box::pin(async move { result })
    }

    fn collect_remote(&self, job_id: String, dest: PathBuf) -> CollectFuture<'_, ()> {
        self.calls
            .lock()
            .unwrap()
            .push(CollectCall::Remote { job_id, dest });
        let result = self.outcome();
        Box::pin(async move { result })
    }
}
