//! Task sources: where a backlog snapshot comes from.
//!
//! The engine itself never touches storage; the CLI reads a JSON snapshot
//! through `TaskSource`.

use super::error::{OptimizerError, Result, SnapshotError};
use super::types::{Task, TaskId, UserPreferences};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything the optimizer needs from storage for one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Backlog {
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Recently completed task ids, most recent first.
    #[serde(default)]
    pub recent_completed: Vec<TaskId>,
}

pub trait TaskSource {
    /// Loads the current backlog snapshot.
    ///
    /// # Errors
    /// Returns `Snapshot` if the backing store cannot be read or parsed.
    fn load(&self) -> Result<Backlog>;
}

/// Reads a backlog from a JSON file.
pub struct JsonTaskSource {
    path: PathBuf,
}

impl JsonTaskSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TaskSource for JsonTaskSource {
    fn load(&self) -> Result<Backlog> {
        read_json(&self.path)
    }
}

/// Reads and deserializes any JSON document.
///
/// # Errors
/// Returns `Snapshot` wrapping the I/O or parse failure.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let wrap = |source: SnapshotError| OptimizerError::Snapshot {
        path: path.to_path_buf(),
        source,
    };
    let raw = fs::read_to_string(path).map_err(|e| wrap(e.into()))?;
    serde_json::from_str(&raw).map_err(|e| wrap(e.into()))
}
