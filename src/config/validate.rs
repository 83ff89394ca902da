// src/config/validate.rs

use std::path::{Component, Path};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SimrunError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SimrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_project_folder(cfg)?;
    validate_remote(cfg)?;
    Ok(())
}

fn validate_project_folder(cfg: &RawConfigFile) -> Result<()> {
    let folder = cfg.workspace.project_folder.trim();
    if folder.is_empty() {
        return Err(SimrunError::ConfigError(
            "[workspace].project_folder must not be empty".to_string(),
        ));
    }

    let mut components = Path::new(folder).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(SimrunError::ConfigError(format!(
            "[workspace].project_folder must be a single directory name (got '{folder}')"
        ))),
    }
}

fn validate_remote(cfg: &RawConfigFile) -> Result<()> {
    let remote = &cfg.remote;

    for placeholder in ["{job_id}", "{dest}"] {
        if !remote.copy_command.contains(placeholder) {
            return Err(SimrunError::ConfigError(format!(
                "[remote].copy_command must contain {placeholder} (got '{}')",
                remote.copy_command
            )));
        }
    }

    if remote.copy_attempts == 0 {
        return Err(SimrunError::ConfigError(
            "[remote].copy_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}
