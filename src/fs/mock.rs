// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

/// In-memory filesystem for tests.
///
/// Paths are used verbatim (no normalisation). Copies whose source file
/// name was registered with [`MockFileSystem::fail_copies_of`] fail.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    failing_copies: Arc<Mutex<HashSet<String>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            failing_copies: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a file, creating parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.entries();
        if let Some(parent) = parent_of(&path) {
            ensure_dir_entry(&mut files, parent);
        }
        files.insert(path.clone(), MockEntry::File(content.into()));
        link_child(&mut files, &path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.entries();
        ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Make every copy of a file with this name fail.
    pub fn fail_copies_of(&self, file_name: &str) {
        self.failing_copies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(file_name.to_string());
    }

    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.entries().get(path.as_ref()) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

fn link_child(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let (Some(parent), Some(name)) = (parent_of(path), path.file_name().and_then(|n| n.to_str()))
    else {
        return;
    };
    if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }
}

fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if files.contains_key(path) {
        return;
    }
    if let Some(parent) = parent_of(path) {
        if parent != path {
            ensure_dir_entry(files, parent);
        }
    }
    files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    link_child(files, path);
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entries().get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries().get(path), Some(MockEntry::Dir(_)))
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        let mut files = self.entries();
        if files.contains_key(path) {
            return Err(anyhow!("already exists: {:?}", path));
        }
        match parent_of(path).map(|p| files.get(p)) {
            Some(Some(MockEntry::Dir(_))) | None => {}
            _ => return Err(anyhow!("parent directory missing: {:?}", path)),
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        link_child(&mut files, path);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut files = self.entries();
        if let Some(MockEntry::File(_)) = files.get(path) {
            return Err(anyhow!("not a directory: {:?}", path));
        }
        ensure_dir_entry(&mut files, path);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.entries().get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let name = from.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self
            .failing_copies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(name)
        {
            return Err(anyhow!("injected copy failure: {:?}", from));
        }

        let content = match self.entries().get(from) {
            Some(MockEntry::File(content)) => content.clone(),
            Some(MockEntry::Dir(_)) => return Err(anyhow!("Is a directory: {:?}", from)),
            None => return Err(anyhow!("File not found: {:?}", from)),
        };
        if !parent_of(to).is_some_and(|p| self.is_dir(p)) {
            return Err(anyhow!("destination directory missing: {:?}", to));
        }

        let bytes = content.len() as u64;
        self.add_file(to, content);
        Ok(bytes)
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        match self.entries().get(path) {
            Some(MockEntry::File(content)) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}
