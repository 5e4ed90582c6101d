use crate::snapshot::SnapshotId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `pulse-data`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Error)]
pub enum DataError {
    #[error("invalid snapshot identifier: {0} (expected YYYYMMDD_HHMM)")]
    InvalidId(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to decode snapshot {id}: {message}")]
    Decode { id: SnapshotId, message: String },

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(SnapshotId),

    #[error("digest not found: {0}")]
    DigestNotFound(SnapshotId),
}

impl DataError {
    /// Determine if the error means the requested document does not exist, as opposed to existing
    /// but being unreadable.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_not_found(&self) -> bool {
        match self {
            DataError::SnapshotNotFound(_) | DataError::DigestNotFound(_) => true,
            _ => false,
        }
    }

    pub(crate) fn io(path: impl AsRef<std::path::Path>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            message: error.to_string(),
        }
    }
}
