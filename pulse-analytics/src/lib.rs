//! # Pulse-Analytics
//! Anomaly detection, snapshot deltas and digest alignment over market pulse snapshots.
//!
//! - [`AnomalyDetector`]: liquidation spike & funding rate extreme [`Alert`]s for one asset.
//! - [`DeltaCalculator`]: close & open interest deltas against the previous snapshot, plus a
//!   trailing 24h change and volume.
//! - [`DigestAligner`]: nearest digest, or the aggregated symbol sections of the last few
//!   digests, for a snapshot.
//!
//! All three are pure functions of their inputs. [`PulseAnalyzer`] combines them over whole
//! snapshots loaded from a [`SnapshotStore`](pulse_data::store::SnapshotStore).

/// Liquidation spike & funding extreme detection.
pub mod anomaly;

/// Alert, digest & report configuration.
pub mod config;

/// Deltas between consecutive snapshots.
pub mod delta;

/// Digest alignment & section extraction.
pub mod digest;

/// All [`Error`](std::error::Error)s generated in Pulse-Analytics.
pub mod error;

/// Per-snapshot reports & per-symbol histories.
pub mod report;

/// Population mean/std & interpolated percentiles.
pub mod stats;

/// Master table of headline figures.
pub mod summary;

pub use anomaly::{Alert, AnomalyDetector};
pub use config::{AlertConfig, DigestConfig, DigestMode, OutputFormat, ReportConfig, ThresholdMode};
pub use delta::{AssetDelta, DeltaCalculator, SignedDelta};
pub use digest::DigestAligner;
pub use error::ReportError;
pub use report::{AssetReport, HistoryRow, PulseAnalyzer, PulseReport};
pub use summary::SummaryRow;
