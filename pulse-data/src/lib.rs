//! # Pulse-Data
//! Normalised models for periodic "market pulse" snapshots and the narrative digests published
//! alongside them.
//!
//! A snapshot is a JSON array of per-symbol order-flow series (OHLCV, open interest, funding
//! rate, liquidations and long/short ratio) produced by an external collection pipeline. This
//! crate decodes them leniently: a missing series is empty, and a malformed numeric field is
//! treated as missing for that single record rather than failing the whole document.
//!
//! Snapshots and digests are listed and loaded through the [`SnapshotStore`](store::SnapshotStore)
//! and [`DigestStore`](store::DigestStore) traits. [`FsStore`](store::fs::FsStore) reads them from a
//! data directory, and [`CachedStore`](store::cache::CachedStore) adds a time-to-live cache in front
//! of the listings.

/// All [`Error`](std::error::Error)s generated in Pulse-Data.
pub mod error;

/// Lenient deserialisers used by the snapshot series models.
pub mod de;

/// Snapshot identifiers, asset records and their time series.
pub mod snapshot;

/// Timestamped free-text digest documents.
pub mod digest;

/// Snapshot & digest stores, plus the listing cache.
pub mod store;

pub use digest::DigestDocument;
pub use error::DataError;
pub use snapshot::{AssetRecord, Snapshot, SnapshotId};
