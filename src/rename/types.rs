use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::history::{BatchId, Operation};

/// A single rename operation
#[derive(Debug, Clone)]
pub struct RenameOperation {
    /// Full path to the source file
    pub source_path: PathBuf,
    /// Original file name
    pub source_name: String,
    /// Full path to the destination
    pub destination_path: PathBuf,
    /// New file name
    pub destination_name: String,
}

impl RenameOperation {
    pub fn new(source_path: PathBuf, destination_name: String) -> Self {
        let source_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let destination_path = source_path
            .parent()
            .map(|p| p.join(&destination_name))
            .unwrap_or_else(|| PathBuf::from(&destination_name));

        Self {
            source_path,
            source_name,
            destination_path,
            destination_name,
        }
    }
}

/// A file that could not be renamed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Cooperative cancellation flag, checked between files
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for a rename run
#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    pub dry_run: bool,
    pub cancel: CancelToken,
}

/// Result of a rename batch operation
#[derive(Debug, Clone)]
pub struct RenameResult {
    pub batch_id: BatchId,
    pub operation: Operation,
    /// Renames performed (or planned, for a dry run), in walk order
    pub operations: Vec<RenameOperation>,
    pub failures: Vec<RenameFailure>,
    /// Files whose computed name equals their current name
    pub unchanged: usize,
    pub dry_run: bool,
}

impl RenameResult {
    pub fn new(batch_id: BatchId, operation: Operation, dry_run: bool) -> Self {
        Self {
            batch_id,
            operation,
            operations: Vec::new(),
            failures: Vec::new(),
            unchanged: 0,
            dry_run,
        }
    }

    pub fn add_operation(&mut self, op: RenameOperation) {
        self.operations.push(op);
    }

    pub fn add_failure(&mut self, path: PathBuf, reason: String) {
        self.failures.push(RenameFailure { path, reason });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}
