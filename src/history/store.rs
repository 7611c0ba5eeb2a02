use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::types::{BatchId, BatchState, BatchSummary, NewRecord, RenameRecord};

/// Error types for history operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to access history file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("History file version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    #[error("History is corrupted: {0}")]
    Corrupted(String),

    #[error("Batch {0} is already recorded")]
    DuplicateBatch(BatchId),

    #[error("Records do not form a single batch: {0}")]
    InconsistentBatch(String),

    #[error("No records for batch {0}")]
    UnknownBatch(BatchId),

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("Could not determine the home directory")]
    HomeDirUnavailable,
}

/// Durable, batched log of renames.
///
/// A store has a single writer. `append` is all-or-nothing: if it returns an
/// error no record of the batch is visible.
pub trait HistoryStore {
    /// Write every record of one batch in a single transaction
    fn append(&mut self, records: &[NewRecord]) -> Result<(), HistoryError>;

    /// Most recently created batch that is applied or redone
    fn last_applied_batch(&self) -> Result<Option<BatchId>, HistoryError>;

    /// Most recently created batch that is undone
    fn last_undone_batch(&self) -> Result<Option<BatchId>, HistoryError>;

    /// All records of a batch, ascending by id
    fn records_of(&self, batch_id: &BatchId) -> Result<Vec<RenameRecord>, HistoryError>;

    /// Set the state of every record of a batch at once
    fn mark_batch(&mut self, batch_id: &BatchId, state: BatchState) -> Result<(), HistoryError>;

    /// Remove all records, returning how many were removed
    fn clear(&mut self) -> Result<usize, HistoryError>;

    /// One summary per batch, newest first
    fn batches(&self) -> Result<Vec<BatchSummary>, HistoryError>;

    /// File name the tree walker must leave alone at any depth
    fn reserved_file_name(&self) -> Option<OsString> {
        None
    }

    /// Where the history lives on disk, if anywhere; the walker skips this
    /// exact file
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Check that `records` share one batch id and operation and that their
/// timestamps strictly increase.
pub(crate) fn validate_batch(records: &[NewRecord]) -> Result<(), HistoryError> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    for pair in records.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);

        if next.batch_id != first.batch_id {
            return Err(HistoryError::InconsistentBatch(format!(
                "mixed batch ids {} and {}",
                first.batch_id, next.batch_id
            )));
        }

        if next.operation != first.operation {
            return Err(HistoryError::InconsistentBatch(format!(
                "mixed operations {} and {}",
                first.operation, next.operation
            )));
        }

        if next.created_at <= prev.created_at {
            return Err(HistoryError::InconsistentBatch(
                "timestamps are not strictly increasing".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::types::Operation;
    use chrono::{TimeZone, Utc};

    fn record(batch: &str, operation: Operation, offset_ns: i64) -> NewRecord {
        NewRecord {
            original_path: PathBuf::from("/tree/a b.txt"),
            new_path: PathBuf::from("/tree/a_b.txt"),
            operation,
            batch_id: BatchId::new(batch),
            created_at: Utc.timestamp_nanos(offset_ns),
        }
    }

    #[test]
    fn test_validate_accepts_single_batch() {
        let records = vec![
            record("1", Operation::Clean, 1),
            record("1", Operation::Clean, 2),
            record("1", Operation::Clean, 3),
        ];
        assert!(validate_batch(&records).is_ok());
        assert!(validate_batch(&[]).is_ok());
    }

    #[test]
    fn test_validate_rejects_mixed_batches() {
        let records = vec![record("1", Operation::Clean, 1), record("2", Operation::Clean, 2)];
        assert!(matches!(
            validate_batch(&records),
            Err(HistoryError::InconsistentBatch(_))
        ));
    }

    #[test]
    fn test_validate_rejects_mixed_operations() {
        let records = vec![record("1", Operation::Clean, 1), record("1", Operation::Number, 2)];
        assert!(matches!(
            validate_batch(&records),
            Err(HistoryError::InconsistentBatch(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_increasing_timestamps() {
        let records = vec![record("1", Operation::Clean, 5), record("1", Operation::Clean, 5)];
        assert!(matches!(
            validate_batch(&records),
            Err(HistoryError::InconsistentBatch(_))
        ));
    }
}
