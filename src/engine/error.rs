//! Error types for the optimizer library.

use super::types::TaskId;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions the engine reports back to the caller instead of defaulting.
#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("task id {0} appears more than once")]
    DuplicateTaskId(TaskId),

    #[error("max_clusters must be at least 1 (got {0})")]
    InvalidClusterCount(usize),

    #[error("no task matches '{0}'")]
    TaskNotFound(String),

    #[error("failed to read snapshot {path}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },
}

/// Underlying cause of a snapshot load failure.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
