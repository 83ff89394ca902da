// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{Result, SimrunError};
use crate::types::RunId;

/// Folder created under the workspace root that holds every run directory.
pub const DEFAULT_PROJECT_FOLDER: &str = "EcoSystemProject(GUI-runs)";

/// Remote copy command used when `[remote].copy_command` is not set.
pub const DEFAULT_REMOTE_COPY_COMMAND: &str =
    "spell cp -f runs/{job_id}/proj/graphs-0.3/ {dest}";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [store]
/// path = "simrun-store.json"
///
/// [workspace]
/// root = "/home/me"
/// project_folder = "EcoSystemProject(GUI-runs)"
///
/// [simulation]
/// working_dir = "/home/me/sim"
///
/// [remote]
/// copy_command = "spell cp -f runs/{job_id}/proj/graphs-0.3/ {dest}"
/// copy_attempts = 3
/// retry_backoff_ms = 500
/// ```
///
/// All sections are optional and have reasonable defaults. This is the
/// unvalidated form; convert with `ConfigFile::try_from`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub workspace: WorkspaceSection,

    #[serde(default)]
    pub simulation: SimulationSection,

    #[serde(default)]
    pub remote: RemoteSection,
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// JSON file holding the persisted run collection and run counter.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("simrun-store.json")
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// `[workspace]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceSection {
    /// Directory under which `project_folder` is created.
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,

    /// Single directory name; each run gets `run_<id>` below it.
    #[serde(default = "default_project_folder")]
    pub project_folder: String,
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_project_folder() -> String {
    DEFAULT_PROJECT_FOLDER.to_string()
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            project_folder: default_project_folder(),
        }
    }
}

/// `[simulation]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SimulationSection {
    /// Directory the run commands are started in. If `None`, the current
    /// working directory of `simrun` is used.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// `[remote]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSection {
    /// Shell command template; `{job_id}` and `{dest}` are substituted.
    #[serde(default = "default_copy_command")]
    pub copy_command: String,

    /// Total number of attempts before the run is marked failed.
    #[serde(default = "default_copy_attempts")]
    pub copy_attempts: u32,

    /// Backoff unit between attempts; attempt `n` waits `n * retry_backoff_ms`.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_copy_command() -> String {
    DEFAULT_REMOTE_COPY_COMMAND.to_string()
}

fn default_copy_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            copy_command: default_copy_command(),
            copy_attempts: default_copy_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl RemoteSection {
    /// Render the copy command for a job and destination directory.
    ///
    /// Both values are shell-quoted and arrive as single words, including
    /// paths below the default project folder, which contains parentheses.
    pub fn render_copy_command(&self, job_id: &str, dest: &Path) -> Result<String> {
        let dest = dest.display().to_string();
        let quoted_job = shlex::try_quote(job_id).map_err(|e| {
            SimrunError::Collection(format!("cannot quote job id {job_id:?}: {e}"))
        })?;
        let quoted_dest = shlex::try_quote(&dest).map_err(|e| {
            SimrunError::Collection(format!("cannot quote destination {dest:?}: {e}"))
        })?;

        Ok(self
            .copy_command
            .replace("{job_id}", &quoted_job)
            .replace("{dest}", &quoted_dest))
    }
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub store: StoreSection,
    pub workspace: WorkspaceSection,
    pub simulation: SimulationSection,
    pub remote: RemoteSection,
}

impl ConfigFile {
    /// Build without validation. Callers outside this module should go
    /// through `ConfigFile::try_from(RawConfigFile)`.
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            store: raw.store,
            workspace: raw.workspace,
            simulation: raw.simulation,
            remote: raw.remote,
        }
    }

    /// `<root>/<project_folder>`
    pub fn project_dir(&self) -> PathBuf {
        self.workspace.root.join(&self.workspace.project_folder)
    }

    /// `<root>/<project_folder>/run_<id>`
    pub fn run_workspace(&self, run_id: RunId) -> PathBuf {
        self.project_dir().join(format!("run_{run_id}"))
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}
