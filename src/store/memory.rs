// src/store/memory.rs

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::errors::Result;
use crate::store::KeyValueStore;

/// In-memory key-value store.
///
/// Clones share the same document, so a test can hand one clone to the
/// runtime and observe through another. `set_count` counts writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    document: Map<String, Value>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls so far.
    pub fn set_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str, default: Value) -> Result<Value> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.document.get(key).cloned().unwrap_or(default))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.document.insert(key.to_string(), value);
        inner.writes += 1;
        Ok(())
    }
}
