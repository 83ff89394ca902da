#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::Value;
use simrun::config::{ConfigFile, RawConfigFile};
use simrun::record::{RunRequest, StartParameters};
use simrun::types::{Platform, RunId};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// Put workspaces (and the store, unless set separately) under `root`.
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.config.workspace.root = root.to_path_buf();
        self.config.store.path = root.join("simrun-store.json");
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.path = path.into();
        self
    }

    pub fn with_project_folder(mut self, folder: &str) -> Self {
        self.config.workspace.project_folder = folder.to_string();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.simulation.working_dir = Some(dir.into());
        self
    }

    pub fn with_copy_command(mut self, command: &str) -> Self {
        self.config.remote.copy_command = command.to_string();
        self
    }

    pub fn with_copy_attempts(mut self, attempts: u32) -> Self {
        self.config.remote.copy_attempts = attempts;
        self
    }

    pub fn with_retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.remote.retry_backoff_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RunRequest`.
pub struct RunRequestBuilder {
    request: RunRequest,
}

impl RunRequestBuilder {
    pub fn new(command: &str) -> Self {
        Self {
            request: RunRequest {
                command: command.to_string(),
                run_id: None,
                start_parameters: StartParameters::default(),
            },
        }
    }

    pub fn run_id(mut self, run_id: RunId) -> Self {
        self.request.run_id = Some(run_id);
        self
    }

    pub fn steps(mut self, steps: u64) -> Self {
        self.request.start_parameters.steps = steps;
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.request.start_parameters.platform = platform;
        self
    }

    pub fn remote(self) -> Self {
        self.platform(Platform::Remote)
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.request
            .start_parameters
            .extra
            .insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> RunRequest {
        self.request
    }
}
