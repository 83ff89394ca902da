// src/store/json_file.rs

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{Result, SimrunError};
use crate::store::KeyValueStore;

/// Key-value store backed by one JSON document on disk.
///
/// Every `set` rewrites the whole document atomically: it is written to a
/// temporary sibling, synced, then renamed over the original. Readers
/// therefore see either the old or the new document, never a torn one.
/// A missing file reads as an empty document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(SimrunError::Persistence(format!(
                "store {} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document)?;
        atomic_write(&self.path, &bytes)
            .map_err(|e| SimrunError::Persistence(format!("{e:#}")))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "store written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str, default: Value) -> Result<Value> {
        let mut document = self.read_document()?;
        Ok(document.remove(key).unwrap_or(default))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(key.to_string(), value);
        self.write_document(&document)
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
        }
    }

    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("store");
    let tmp = path.with_file_name(format!(".{}.tmp.{}", name, std::process::id()));

    let mut file = File::create(&tmp).with_context(|| format!("creating {:?}", tmp))?;
    file.write_all(bytes)
        .with_context(|| format!("writing {:?}", tmp))?;
    file.sync_all().with_context(|| format!("syncing {:?}", tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming {:?} to {:?}", tmp, path))?;
    Ok(())
}
