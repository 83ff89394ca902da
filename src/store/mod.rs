// src/store/mod.rs

//! Durable run collection.
//!
//! Persistence is a tiny key-value contract ([`KeyValueStore`]) with two
//! keys:
//!
//! - `"sims"`   the whole list of [`RunRecord`]s
//! - `"run_id"` the last assigned run id
//!
//! [`RunStore`] is the record-level view the supervisor uses. It only knows
//! whole-collection reads and writes. None of this is safe for concurrent
//! writers; the supervisor runtime is the single writer.

use serde_json::Value;

use crate::errors::{Result, SimrunError};
use crate::record::RunRecord;
use crate::types::RunId;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Key holding the serialized run collection.
pub const RUNS_KEY: &str = "sims";

/// Key holding the run id counter.
pub const RUN_ID_KEY: &str = "run_id";

/// Minimal get/set persistence.
pub trait KeyValueStore: Send {
    /// Value under `key`, or `default` if absent.
    fn get(&self, key: &str, default: Value) -> Result<Value>;

    /// Durably replace the value under `key`.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Whole-collection access to run records.
pub trait RunStore: Send {
    fn load(&self) -> Result<Vec<RunRecord>>;

    /// Replace the persisted collection with `runs`.
    fn save_all(&mut self, runs: &[RunRecord]) -> Result<()>;

    /// Read the counter, increment it, persist it and return the new value.
    fn next_run_id(&mut self) -> Result<RunId>;
}

impl<T: KeyValueStore> RunStore for T {
    fn load(&self) -> Result<Vec<RunRecord>> {
        let value = self.get(RUNS_KEY, Value::Array(Vec::new()))?;
        Ok(serde_json::from_value(value)?)
    }

    fn save_all(&mut self, runs: &[RunRecord]) -> Result<()> {
        let value = serde_json::to_value(runs)?;
        self.set(RUNS_KEY, value)
    }

    fn next_run_id(&mut self) -> Result<RunId> {
        let stored = self.get(RUN_ID_KEY, Value::from(0u64))?;
        let current = stored.as_u64().ok_or_else(|| {
            SimrunError::Persistence(format!(
                "run id counter {stored} is not a non-negative integer"
            ))
        })?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| SimrunError::Persistence("run id counter overflowed".to_string()))?;
        self.set(RUN_ID_KEY, Value::from(next))?;
        Ok(next)
    }
}
