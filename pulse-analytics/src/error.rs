use pulse_data::{error::DataError, snapshot::SnapshotId};
use thiserror::Error;

/// All errors generated while assembling reports in `pulse-analytics`.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ReportError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("no snapshots available")]
    NoSnapshots,

    #[error("snapshot {0} is not in the snapshot listing")]
    UnknownSnapshot(SnapshotId),
}
