//! Relational history store backed by SQLite.
//!
//! One table holds every rename record. Batch state is kept as the
//! `reverted`/`redone` flag pair and a CHECK constraint rejects both set at
//! once. Timestamps are epoch nanoseconds so that ordering by `created_at`
//! is exact.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::store::{validate_batch, HistoryError, HistoryStore};
use super::types::{BatchId, BatchState, BatchSummary, NewRecord, Operation, RenameRecord};

/// Default database file name, placed in the user's home directory
pub const DB_FILE: &str = ".name_tidy_history.db";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS rename_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    original_path TEXT NOT NULL,
    new_path TEXT NOT NULL,
    operation TEXT NOT NULL CHECK (operation IN ('clean', 'number')),
    batch_id TEXT NOT NULL,
    created_at INTEGER NOT NULL,      -- epoch ns
    reverted INTEGER NOT NULL DEFAULT 0,
    redone INTEGER NOT NULL DEFAULT 0,
    CHECK (NOT (reverted = 1 AND redone = 1))
);

CREATE INDEX IF NOT EXISTS idx_history_batch ON rename_history(batch_id);
CREATE INDEX IF NOT EXISTS idx_history_state ON rename_history(created_at, reverted, redone);
"#;

const RECORD_COLUMNS: &str =
    "id, original_path, new_path, operation, batch_id, created_at, reverted, redone";

/// Row as read from SQLite, before domain validation
struct RawRecord {
    id: i64,
    original_path: String,
    new_path: String,
    operation: String,
    batch_id: String,
    created_at: i64,
    reverted: bool,
    redone: bool,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            original_path: row.get(1)?,
            new_path: row.get(2)?,
            operation: row.get(3)?,
            batch_id: row.get(4)?,
            created_at: row.get(5)?,
            reverted: row.get(6)?,
            redone: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<RenameRecord, HistoryError> {
        let id = u64::try_from(self.id)
            .map_err(|_| HistoryError::Corrupted(format!("negative record id {}", self.id)))?;

        Ok(RenameRecord {
            id,
            original_path: PathBuf::from(self.original_path),
            new_path: PathBuf::from(self.new_path),
            operation: parse_operation(&self.operation)?,
            batch_id: BatchId::new(self.batch_id),
            created_at: from_nanos(self.created_at),
            state: parse_state(self.reverted, self.redone, self.id)?,
        })
    }
}

/// SQLite-backed [`HistoryStore`]
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;

        info!("Opened history database: {:?}", path);

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open the database in the user's home directory
    pub fn open_default() -> Result<Self, HistoryError> {
        Self::open(&default_db_path()?)
    }

    /// Throwaway database, for tests
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn, path: None })
    }

    fn latest_batch(&self, condition: &str) -> Result<Option<BatchId>, HistoryError> {
        let sql = format!(
            "SELECT batch_id FROM rename_history WHERE {} \
             ORDER BY created_at DESC, id DESC LIMIT 1",
            condition
        );

        let batch: Option<String> = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .optional()?;

        Ok(batch.map(BatchId::new))
    }
}

/// `~/.name_tidy_history.db`
pub fn default_db_path() -> Result<PathBuf, HistoryError> {
    dirs::home_dir()
        .map(|home| home.join(DB_FILE))
        .ok_or(HistoryError::HomeDirUnavailable)
}

impl HistoryStore for SqliteStore {
    fn append(&mut self, records: &[NewRecord]) -> Result<(), HistoryError> {
        validate_batch(records)?;

        let Some(first) = records.first() else {
            return Ok(());
        };

        // Dropping the transaction without commit rolls it back
        let tx = self.conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM rename_history WHERE batch_id = ?1)",
            params![first.batch_id.as_str()],
            |row| row.get(0),
        )?;
        if exists {
            return Err(HistoryError::DuplicateBatch(first.batch_id.clone()));
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO rename_history \
                 (original_path, new_path, operation, batch_id, created_at, reverted, redone) \
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, 0)",
            )?;

            for record in records {
                stmt.execute(params![
                    path_text(&record.original_path)?,
                    path_text(&record.new_path)?,
                    record.operation.as_str(),
                    record.batch_id.as_str(),
                    to_nanos(record.created_at)?,
                ])?;
            }
        }

        tx.commit()?;

        debug!(
            batch = %first.batch_id,
            count = records.len(),
            "Appended batch to history"
        );
        Ok(())
    }

    fn last_applied_batch(&self) -> Result<Option<BatchId>, HistoryError> {
        self.latest_batch("reverted = 0")
    }

    fn last_undone_batch(&self) -> Result<Option<BatchId>, HistoryError> {
        self.latest_batch("reverted = 1 AND redone = 0")
    }

    fn records_of(&self, batch_id: &BatchId) -> Result<Vec<RenameRecord>, HistoryError> {
        let sql = format!(
            "SELECT {} FROM rename_history WHERE batch_id = ?1 ORDER BY id ASC",
            RECORD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let raw = stmt
            .query_map(params![batch_id.as_str()], RawRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter().map(RawRecord::into_record).collect()
    }

    fn mark_batch(&mut self, batch_id: &BatchId, state: BatchState) -> Result<(), HistoryError> {
        let updated = self.conn.execute(
            "UPDATE rename_history SET reverted = ?1, redone = ?2 WHERE batch_id = ?3",
            params![state.reverted(), state.redone(), batch_id.as_str()],
        )?;

        if updated == 0 {
            return Err(HistoryError::UnknownBatch(batch_id.clone()));
        }

        debug!(batch = %batch_id, state = %state, rows = updated, "Marked batch");
        Ok(())
    }

    fn clear(&mut self) -> Result<usize, HistoryError> {
        let removed = self.conn.execute("DELETE FROM rename_history", [])?;
        info!("Deleted {} history records", removed);
        Ok(removed)
    }

    fn batches(&self) -> Result<Vec<BatchSummary>, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT batch_id, operation, reverted, redone, COUNT(*), MAX(created_at) \
             FROM rename_history \
             GROUP BY batch_id \
             ORDER BY MAX(created_at) DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(batch_id, operation, reverted, redone, count, created_at)| {
                Ok(BatchSummary {
                    state: parse_state(reverted, redone, 0)?,
                    batch_id: BatchId::new(batch_id),
                    operation: parse_operation(&operation)?,
                    record_count: usize::try_from(count).unwrap_or(0),
                    created_at: from_nanos(created_at),
                })
            })
            .collect()
    }

    fn location(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn path_text(path: &Path) -> Result<&str, HistoryError> {
    path.to_str()
        .ok_or_else(|| HistoryError::NonUtf8Path(path.to_path_buf()))
}

fn to_nanos(at: DateTime<Utc>) -> Result<i64, HistoryError> {
    at.timestamp_nanos_opt()
        .ok_or_else(|| HistoryError::Corrupted(format!("timestamp out of range: {}", at)))
}

fn from_nanos(nanos: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(nanos)
}

fn parse_operation(value: &str) -> Result<Operation, HistoryError> {
    Operation::parse(value)
        .ok_or_else(|| HistoryError::Corrupted(format!("unknown operation '{}'", value)))
}

fn parse_state(reverted: bool, redone: bool, id: i64) -> Result<BatchState, HistoryError> {
    BatchState::from_flags(reverted, redone).ok_or_else(|| {
        HistoryError::Corrupted(format!("record {} is both reverted and redone", id))
    })
}
