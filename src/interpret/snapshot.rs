// src/interpret/snapshot.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One structured progress record printed by the simulation, e.g.
/// `{"steps": 120, "food": 31, "agents": 88}`.
///
/// The only structural requirement is that the line is a JSON object; the
/// counters themselves are simulation-defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `steps` counter, if present and numeric.
    pub fn steps(&self) -> Option<f64> {
        self.0.get("steps").and_then(Value::as_f64)
    }
}

/// Why a line is not a snapshot. Expected for most lines; never fatal.
#[derive(Debug, Error)]
pub enum SnapshotParseError {
    #[error("line is not JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("line is JSON but not an object")]
    NotAnObject,
}

/// Parse a line as a progress snapshot.
pub fn parse_snapshot(text: &str) -> Result<Snapshot, SnapshotParseError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(fields) => Ok(Snapshot(fields)),
        _ => Err(SnapshotParseError::NotAnObject),
    }
}
