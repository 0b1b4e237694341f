use retouch_common::CommonError;
use retouch_overrides::OverrideError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Snapshot not found: {}", .0.display())]
    SnapshotMissing(PathBuf),

    #[error("Invalid snapshot {}: {source}", .path.display())]
    InvalidSnapshot {
        path: PathBuf,
        #[source]
        source: OverrideError,
    },

    #[error("Malformed literal for `{marker}` at byte {offset}: {reason}")]
    MalformedLiteral {
        marker: String,
        offset: usize,
        reason: String,
    },

    #[error("Overlapping edits at byte {0}")]
    OverlappingEdits(usize),

    #[error("Failed to patch {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<PatchError>,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(#[from] CommonError),
}

impl PatchError {
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        PatchError::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}
