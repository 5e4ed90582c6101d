use super::{DigestStore, SnapshotStore};
use crate::{
    digest::DigestDocument,
    error::DataError,
    snapshot::{Snapshot, SnapshotId},
};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// File name prefix of snapshot documents, eg/ `pulse_20250101_0000.json`.
pub const SNAPSHOT_PREFIX: &str = "pulse_";
pub const SNAPSHOT_EXTENSION: &str = ".json";

/// File name prefix of digest documents, eg/ `gpt_digest_20250101_0000.txt`.
pub const DIGEST_PREFIX: &str = "gpt_digest_";
pub const DIGEST_EXTENSION: &str = ".txt";

/// [`SnapshotStore`] & [`DigestStore`] reading documents from a single data directory.
///
/// Files that match a prefix & extension but carry an unparseable identifier are skipped.
#[derive(Clone, Debug)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self, id: SnapshotId) -> PathBuf {
        self.dir
            .join(format!("{SNAPSHOT_PREFIX}{id}{SNAPSHOT_EXTENSION}"))
    }

    pub fn digest_path(&self, id: SnapshotId) -> PathBuf {
        self.dir.join(format!("{DIGEST_PREFIX}{id}{DIGEST_EXTENSION}"))
    }

    fn list(&self, prefix: &str, extension: &str) -> Result<Vec<SnapshotId>, DataError> {
        let entries = fs::read_dir(&self.dir).map_err(|error| DataError::io(&self.dir, error))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| DataError::io(&self.dir, error))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };

            if let Some(id) = parse_file_id(file_name, prefix, extension) {
                ids.push(id);
            }
        }

        ids.sort_unstable();
        ids.dedup();
        debug!(dir = %self.dir.display(), prefix, count = ids.len(), "listed documents");
        Ok(ids)
    }
}

impl SnapshotStore for FsStore {
    fn snapshot_ids(&self) -> Result<Vec<SnapshotId>, DataError> {
        self.list(SNAPSHOT_PREFIX, SNAPSHOT_EXTENSION)
    }

    fn load_snapshot(&self, id: SnapshotId) -> Result<Snapshot, DataError> {
        let path = self.snapshot_path(id);
        let json = fs::read_to_string(&path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => DataError::SnapshotNotFound(id),
            _ => DataError::io(&path, error),
        })?;

        Snapshot::from_json(id, &json)
    }
}

impl DigestStore for FsStore {
    fn digest_ids(&self) -> Result<Vec<SnapshotId>, DataError> {
        self.list(DIGEST_PREFIX, DIGEST_EXTENSION)
    }

    fn load_digest(&self, id: SnapshotId) -> Result<DigestDocument, DataError> {
        let path = self.digest_path(id);
        let text = fs::read_to_string(&path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => DataError::DigestNotFound(id),
            _ => DataError::io(&path, error),
        })?;

        Ok(DigestDocument::new(id, text))
    }
}

/// Parse the [`SnapshotId`] embedded in a `<prefix><YYYYMMDD_HHMM><extension>` file name.
fn parse_file_id(file_name: &str, prefix: &str, extension: &str) -> Option<SnapshotId> {
    let raw = file_name.strip_prefix(prefix)?.strip_suffix(extension)?;
    match raw.parse() {
        Ok(id) => Some(id),
        Err(error) => {
            warn!(file_name, %error, "skipping file with unparseable identifier");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_parse_file_id() {
        struct TestCase {
            input: &'static str,
            expected: Option<&'static str>,
        }

        let tests = vec![
            TestCase {
                // TC0: snapshot file
                input: "pulse_20250101_0400.json",
                expected: Some("20250101_0400"),
            },
            TestCase {
                // TC1: wrong extension
                input: "pulse_20250101_0400.json.bak",
                expected: None,
            },
            TestCase {
                // TC2: digest file does not match snapshot prefix
                input: "gpt_digest_20250101_0400.txt",
                expected: None,
            },
            TestCase {
                // TC3: unparseable identifier
                input: "pulse_latest.json",
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = parse_file_id(test.input, SNAPSHOT_PREFIX, SNAPSHOT_EXTENSION);
            let expected = test.expected.map(|raw| raw.parse::<SnapshotId>().unwrap());
            assert_eq!(actual, expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_fs_store_lists_in_chronological_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pulse_20250102_0000.json", "[]");
        write(dir.path(), "pulse_20250101_0800.json", "[]");
        write(dir.path(), "pulse_20250101_1600.json", "[]");
        write(dir.path(), "pulse_broken.json", "[]");
        write(dir.path(), "gpt_digest_20250101_0800.txt", "=== BTC ===\nquiet");
        write(dir.path(), "notes.md", "ignored");

        let store = FsStore::new(dir.path());

        let snapshots = store
            .snapshot_ids()
            .unwrap()
            .into_iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            snapshots,
            vec!["20250101_0800", "20250101_1600", "20250102_0000"]
        );

        let digests = store.load_digests().unwrap();
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].id.to_string(), "20250101_0800");
        assert_eq!(digests[0].text, "=== BTC ===\nquiet");
    }

    #[test]
    fn test_fs_store_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pulse_20250101_0000.json", "{ not valid");
        let store = FsStore::new(dir.path());

        let present: SnapshotId = "20250101_0000".parse().unwrap();
        let missing: SnapshotId = "20250101_0400".parse().unwrap();

        assert!(matches!(
            store.load_snapshot(present),
            Err(DataError::Decode { id, .. }) if id == present
        ));
        assert_eq!(
            store.load_snapshot(missing),
            Err(DataError::SnapshotNotFound(missing))
        );
        assert_eq!(
            store.load_digest(missing),
            Err(DataError::DigestNotFound(missing))
        );
    }

    #[test]
    fn test_fs_store_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("does-not-exist"));

        assert!(matches!(store.snapshot_ids(), Err(DataError::Io { .. })));
    }
}
