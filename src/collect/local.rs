// src/collect/local.rs

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use blake3::Hasher;
use tracing::{debug, info};

use crate::errors::{Result, SimrunError};
use crate::fs::FileSystem;
use crate::record::ArtifactEntry;

/// Copy each file directly inside `source` into `dest` under the same name.
///
/// Subdirectories are skipped. The first failing copy aborts the rest;
/// files copied before it stay in `dest`. Entries are copied in name order.
pub fn collect_local(fs: &dyn FileSystem, source: &Path, dest: &Path) -> Result<Vec<ArtifactEntry>> {
    if !fs.is_dir(dest) {
        return Err(SimrunError::Collection(format!(
            "workspace {} does not exist",
            dest.display()
        )));
    }

    let mut entries = fs
        .read_dir(source)
        .map_err(|e| SimrunError::Collection(format!("{e:#}")))?;
    entries.sort();

    let mut artifacts = Vec::new();
    for path in entries {
        if !fs.is_file(&path) {
            debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = dest.join(name);

        let bytes = fs.copy(&path, &target).map_err(|e| {
            SimrunError::Collection(format!(
                "copying {} after {} file(s): {e:#}",
                path.display(),
                artifacts.len()
            ))
        })?;
        let digest = artifact_digest(fs, &target).map_err(|e| SimrunError::Collection(format!("{e:#}")))?;

        debug!(from = %path.display(), to = %target.display(), bytes, "artifact copied");
        artifacts.push(ArtifactEntry {
            name: name.to_string_lossy().into_owned(),
            bytes,
            blake3: digest,
        });
    }

    info!(
        source = %source.display(),
        dest = %dest.display(),
        count = artifacts.len(),
        "local artifacts collected"
    );
    Ok(artifacts)
}

/// blake3 hex digest of a file.
pub fn artifact_digest(fs: &dyn FileSystem, path: &Path) -> anyhow::Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening artifact for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
