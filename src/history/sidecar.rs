use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::memory::MemoryStore;
use super::store::{HistoryError, HistoryStore};
use super::types::{
    BatchId, BatchState, BatchSummary, NewRecord, RenameRecord, SidecarFile, SIDECAR_VERSION,
};

/// Name of the history file kept at the root of a tree
pub const SIDECAR_FILE: &str = ".NameTidy_History";

/// History stored as JSON next to the files it describes.
///
/// Every mutation is applied to a copy, written to disk, and only then made
/// visible, so a failed write leaves both the file and the store unchanged.
pub struct SidecarStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl SidecarStore {
    /// Load the sidecar for the tree rooted at `root`
    pub fn for_root(root: &Path) -> Result<Self, HistoryError> {
        Self::load(root.join(SIDECAR_FILE))
    }

    /// Load history from `path`; a missing file is an empty history
    pub fn load(path: PathBuf) -> Result<Self, HistoryError> {
        let inner = match File::open(&path) {
            Ok(file) => {
                let sidecar: SidecarFile = serde_json::from_reader(BufReader::new(file))?;

                if sidecar.version != SIDECAR_VERSION {
                    return Err(HistoryError::VersionMismatch {
                        expected: SIDECAR_VERSION.to_string(),
                        found: sidecar.version,
                    });
                }

                info!("Loaded {} history records from {:?}", sidecar.records.len(), path);
                MemoryStore::from_records(sidecar.records)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No sidecar at {:?}, starting empty", path);
                MemoryStore::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, inner })
    }

    fn commit(&mut self, next: MemoryStore) -> Result<(), HistoryError> {
        write_sidecar(&self.path, next.records())?;
        self.inner = next;
        Ok(())
    }
}

fn write_sidecar(path: &Path, records: &[RenameRecord]) -> Result<(), HistoryError> {
    let sidecar = SidecarFile {
        version: SIDECAR_VERSION.to_string(),
        records: records.to_vec(),
    };

    // Write to temporary file first
    let temp_path = path.with_extension("tmp");

    {
        let file = File::create(&temp_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &sidecar)?;
    }

    // Atomic rename
    fs::rename(&temp_path, path)?;

    debug!("History written to: {:?}", path);
    Ok(())
}

impl HistoryStore for SidecarStore {
    fn append(&mut self, records: &[NewRecord]) -> Result<(), HistoryError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut next = self.inner.clone();
        next.append(records)?;
        self.commit(next)
    }

    fn last_applied_batch(&self) -> Result<Option<BatchId>, HistoryError> {
        self.inner.last_applied_batch()
    }

    fn last_undone_batch(&self) -> Result<Option<BatchId>, HistoryError> {
        self.inner.last_undone_batch()
    }

    fn records_of(&self, batch_id: &BatchId) -> Result<Vec<RenameRecord>, HistoryError> {
        self.inner.records_of(batch_id)
    }

    fn mark_batch(&mut self, batch_id: &BatchId, state: BatchState) -> Result<(), HistoryError> {
        let mut next = self.inner.clone();
        next.mark_batch(batch_id, state)?;
        self.commit(next)
    }

    fn clear(&mut self) -> Result<usize, HistoryError> {
        let removed = self.inner.len();

        match fs::remove_file(&self.path) {
            Ok(()) => info!("Removed sidecar {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.inner = MemoryStore::new();
        Ok(removed)
    }

    fn batches(&self) -> Result<Vec<BatchSummary>, HistoryError> {
        self.inner.batches()
    }

    fn reserved_file_name(&self) -> Option<OsString> {
        Some(OsString::from(SIDECAR_FILE))
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::memory::tests::{exercise_store_contract, make_batch};
    use crate::history::types::Operation;
    use tempfile::tempdir;

    #[test]
    fn test_sidecar_store_contract() {
        let dir = tempdir().unwrap();
        let mut store = SidecarStore::for_root(dir.path()).unwrap();
        exercise_store_contract(&mut store);
    }

    #[test]
    fn test_sidecar_persists_across_loads() {
        let dir = tempdir().unwrap();

        {
            let mut store = SidecarStore::for_root(dir.path()).unwrap();
            store.append(&make_batch("7", Operation::Number, 70, 2)).unwrap();
            store.mark_batch(&BatchId::new("7"), BatchState::Undone).unwrap();
        }

        let store = SidecarStore::for_root(dir.path()).unwrap();
        assert_eq!(store.last_undone_batch().unwrap(), Some(BatchId::new("7")));
        assert_eq!(store.records_of(&BatchId::new("7")).unwrap().len(), 2);
    }

    #[test]
    fn test_sidecar_file_is_pretty_json() {
        let dir = tempdir().unwrap();
        let mut store = SidecarStore::for_root(dir.path()).unwrap();
        store.append(&make_batch("1", Operation::Clean, 10, 1)).unwrap();

        let content = fs::read_to_string(dir.path().join(SIDECAR_FILE)).unwrap();
        assert!(content.contains('\n'));
        assert!(content.contains("\"version\": \"1.0\""));
        assert!(content.contains("\"state\": \"applied\""));

        // Temp file should not exist after write
        assert!(!dir.path().join(SIDECAR_FILE).with_extension("tmp").exists());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempdir().unwrap();
        let mut store = SidecarStore::for_root(dir.path()).unwrap();
        store.append(&make_batch("1", Operation::Clean, 10, 3)).unwrap();

        assert_eq!(store.clear().unwrap(), 3);
        assert!(!dir.path().join(SIDECAR_FILE).exists());
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_version_mismatch_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SIDECAR_FILE),
            r#"{"version": "0.1", "records": []}"#,
        )
        .unwrap();

        let result = SidecarStore::for_root(dir.path());
        assert!(matches!(result, Err(HistoryError::VersionMismatch { .. })));
    }

    #[test]
    fn test_corrupted_sidecar_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SIDECAR_FILE), "{ invalid json }").unwrap();

        let result = SidecarStore::for_root(dir.path());
        assert!(matches!(result, Err(HistoryError::Serialize(_))));
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let missing_parent = dir.path().join("gone").join(SIDECAR_FILE);
        let mut store = SidecarStore::load(missing_parent).unwrap();

        assert!(store.append(&make_batch("1", Operation::Clean, 10, 1)).is_err());
        assert_eq!(store.last_applied_batch().unwrap(), None);
    }
}
