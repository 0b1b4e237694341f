//! Error types for the override store

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverrideError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Store file must contain a JSON object: {}", .0.display())]
    NotAnObject(PathBuf),

    #[error("Snapshot not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),
}
