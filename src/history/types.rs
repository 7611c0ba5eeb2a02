use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const SIDECAR_VERSION: &str = "1.0";

/// Kind of rename that produced a batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Clean,
    Number,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Clean => "clean",
            Operation::Number => "number",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "clean" => Some(Operation::Clean),
            "number" => Some(Operation::Number),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a batch sits in its undo/redo lifecycle.
///
/// Storage keeps this as the `(reverted, redone)` flag pair; the pair
/// `(true, true)` has no variant and is rejected when read back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Applied,
    Undone,
    Redone,
}

impl BatchState {
    pub fn from_flags(reverted: bool, redone: bool) -> Option<Self> {
        match (reverted, redone) {
            (false, false) => Some(BatchState::Applied),
            (true, false) => Some(BatchState::Undone),
            (false, true) => Some(BatchState::Redone),
            (true, true) => None,
        }
    }

    pub fn reverted(&self) -> bool {
        matches!(self, BatchState::Undone)
    }

    pub fn redone(&self) -> bool {
        matches!(self, BatchState::Redone)
    }

    /// Applied and redone batches can be undone
    pub fn is_undoable(&self) -> bool {
        matches!(self, BatchState::Applied | BatchState::Redone)
    }

    pub fn is_redoable(&self) -> bool {
        matches!(self, BatchState::Undone)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::Applied => "applied",
            BatchState::Undone => "undone",
            BatchState::Redone => "redone",
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier shared by every record of one engine run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rename about to be written to history; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub operation: Operation,
    pub batch_id: BatchId,
    pub created_at: DateTime<Utc>,
}

/// A rename as stored in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRecord {
    pub id: u64,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub operation: Operation,
    pub batch_id: BatchId,
    pub created_at: DateTime<Utc>,
    pub state: BatchState,
}

impl RenameRecord {
    pub fn from_new(id: u64, record: &NewRecord) -> Self {
        Self {
            id,
            original_path: record.original_path.clone(),
            new_path: record.new_path.clone(),
            operation: record.operation,
            batch_id: record.batch_id.clone(),
            created_at: record.created_at,
            state: BatchState::Applied,
        }
    }
}

/// One line of `history list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub batch_id: BatchId,
    pub operation: Operation,
    pub state: BatchState,
    pub record_count: usize,
    pub created_at: DateTime<Utc>,
}

/// The sidecar file structure (serialized to JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarFile {
    pub version: String,
    pub records: Vec<RenameRecord>,
}

impl Default for SidecarFile {
    fn default() -> Self {
        Self {
            version: SIDECAR_VERSION.to_string(),
            records: Vec::new(),
        }
    }
}
