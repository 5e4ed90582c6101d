use crate::error::DataError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// `chrono` format of a [`SnapshotId`], eg/ `20250101_0930`.
pub const SNAPSHOT_ID_FORMAT: &str = "%Y%m%d_%H%M";

/// Identifier of a snapshot (and of the digest published for it): a UTC timestamp at minute
/// resolution, rendered as `YYYYMMDD_HHMM`.
///
/// Identifiers order chronologically.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct SnapshotId(DateTime<Utc>);

impl SnapshotId {
    /// Construct a [`SnapshotId`] from a timestamp, truncated to the minute.
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        let seconds = time.timestamp();
        let truncated = DateTime::from_timestamp(seconds - seconds.rem_euclid(60), 0).unwrap_or(time);
        Self(truncated)
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }

    /// Absolute distance between two identifiers in seconds.
    pub fn abs_diff_secs(&self, other: &SnapshotId) -> u64 {
        self.timestamp().abs_diff(other.timestamp())
    }
}

impl FromStr for SnapshotId {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s.trim(), SNAPSHOT_ID_FORMAT)
            .map(|naive| Self(naive.and_utc()))
            .map_err(|_| DataError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SNAPSHOT_ID_FORMAT))
    }
}

impl Serialize for SnapshotId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SnapshotId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
