use std::fmt;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::history::{BatchId, BatchState, HistoryError, HistoryStore, RenameRecord};
use crate::output::Reporter;
use crate::rename::{rename_no_clobber, RenameFailure};

#[derive(Debug, thiserror::Error)]
pub enum RevertError {
    #[error("no operation to undo")]
    NothingToUndo,

    #[error("no operation to redo")]
    NothingToRedo,

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Which way a batch is being replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertDirection {
    /// new_path -> original_path
    Undo,
    /// original_path -> new_path
    Redo,
}

impl RevertDirection {
    /// State the batch moves to once replayed
    fn target_state(&self) -> BatchState {
        match self {
            RevertDirection::Undo => BatchState::Undone,
            RevertDirection::Redo => BatchState::Redone,
        }
    }
}

impl fmt::Display for RevertDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertDirection::Undo => write!(f, "undo"),
            RevertDirection::Redo => write!(f, "redo"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RevertOptions {
    pub dry_run: bool,
}

/// A single replayed rename
#[derive(Debug, Clone)]
pub struct RevertOperation {
    pub record_id: u64,
    pub from: PathBuf,
    pub to: PathBuf,
}

impl RevertOperation {
    fn for_record(record: &RenameRecord, direction: RevertDirection) -> Self {
        let (from, to) = match direction {
            RevertDirection::Undo => (&record.new_path, &record.original_path),
            RevertDirection::Redo => (&record.original_path, &record.new_path),
        };
        Self {
            record_id: record.id,
            from: from.clone(),
            to: to.clone(),
        }
    }
}

/// Result of an undo or redo
#[derive(Debug)]
pub struct RevertResult {
    pub batch_id: BatchId,
    pub direction: RevertDirection,
    pub operations: Vec<RevertOperation>,
    /// Sources that no longer existed
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<RenameFailure>,
    pub dry_run: bool,
}

impl RevertResult {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Restore the original names of the most recent applied or redone batch
pub fn undo(
    store: &mut dyn HistoryStore,
    options: &RevertOptions,
    reporter: &mut Reporter,
) -> Result<RevertResult, RevertError> {
    let batch_id = store
        .last_applied_batch()?
        .ok_or(RevertError::NothingToUndo)?;

    replay(store, batch_id, RevertDirection::Undo, options, reporter)
}

/// Re-apply the most recently created undone batch
pub fn redo(
    store: &mut dyn HistoryStore,
    options: &RevertOptions,
    reporter: &mut Reporter,
) -> Result<RevertResult, RevertError> {
    let batch_id = store
        .last_undone_batch()?
        .ok_or(RevertError::NothingToRedo)?;

    replay(store, batch_id, RevertDirection::Redo, options, reporter)
}

fn replay(
    store: &mut dyn HistoryStore,
    batch_id: BatchId,
    direction: RevertDirection,
    options: &RevertOptions,
    reporter: &mut Reporter,
) -> Result<RevertResult, RevertError> {
    let mut records = store.records_of(&batch_id)?;
    records.sort_by_key(|r| r.id);
    if direction == RevertDirection::Undo {
        records.reverse();
    }

    info!(
        batch = %batch_id,
        direction = %direction,
        records = records.len(),
        dry_run = options.dry_run,
        "Replaying batch"
    );

    let mut result = RevertResult {
        batch_id: batch_id.clone(),
        direction,
        operations: Vec::with_capacity(records.len()),
        skipped: Vec::new(),
        failures: Vec::new(),
        dry_run: options.dry_run,
    };

    for record in &records {
        let op = RevertOperation::for_record(record, direction);
        debug!("Checking {}: {:?} -> {:?}", direction, op.from, op.to);

        if op.from.symlink_metadata().is_err() {
            warn!("Source no longer exists: {:?}", op.from);
            reporter.warn(&format!("{} no longer exists, skipping", op.from.display()));
            result.skipped.push(op.from);
            continue;
        }

        if options.dry_run {
            reporter.planned(&op.from, &op.to);
            result.operations.push(op);
            continue;
        }

        if let Err(e) = rename_no_clobber(&op.from, &op.to) {
            error!("Error renaming {:?} to {:?}: {}", op.from, op.to, e);
            reporter.file_error(&op.from, &e.to_string());
            result.failures.push(RenameFailure {
                path: op.from,
                reason: e.to_string(),
            });
            continue;
        }

        reporter.renamed(&op.from, &op.to);
        result.operations.push(op);
    }

    if !options.dry_run {
        store.mark_batch(&batch_id, direction.target_state())?;
        info!("Batch {} marked {}", batch_id, direction.target_state());
    }

    Ok(result)
}
