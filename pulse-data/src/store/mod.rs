use crate::{digest::DigestDocument, error::DataError, snapshot::{Snapshot, SnapshotId}};

/// Directory backed [`SnapshotStore`] & [`DigestStore`].
pub mod fs;

/// Time-to-live listing cache and the [`CachedStore`](cache::CachedStore) wrapper.
pub mod cache;

/// Source of [`Snapshot`]s.
pub trait SnapshotStore {
    /// Identifiers of every available snapshot, in chronological order.
    fn snapshot_ids(&self) -> Result<Vec<SnapshotId>, DataError>;

    fn load_snapshot(&self, id: SnapshotId) -> Result<Snapshot, DataError>;
}

/// Source of [`DigestDocument`]s.
pub trait DigestStore {
    /// Identifiers of every available digest, in chronological order.
    fn digest_ids(&self) -> Result<Vec<SnapshotId>, DataError>;

    fn load_digest(&self, id: SnapshotId) -> Result<DigestDocument, DataError>;

    /// Load every available digest, in chronological order.
    fn load_digests(&self) -> Result<Vec<DigestDocument>, DataError> {
        self.digest_ids()?
            .into_iter()
            .map(|id| self.load_digest(id))
            .collect()
    }
}
