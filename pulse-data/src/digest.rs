use crate::snapshot::SnapshotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Narrative digest published alongside snapshots.
///
/// The text holds zero or more per-asset sections, each introduced by a `=== SYMBOL ===` marker
/// line and running until the next marker line or the end of the document.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
pub struct DigestDocument {
    pub id: SnapshotId,
    pub text: String,
}

impl DigestDocument {
    pub fn new(id: SnapshotId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.id.time()
    }
}
