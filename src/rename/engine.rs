use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::clock;
use crate::history::{HistoryError, HistoryStore, NewRecord};
use crate::output::Reporter;
use crate::walker::{resolve_root, walk_files, ScanError, WalkFilter};

use super::strategy::{IndexTable, NamingContext, NamingStrategy};
use super::types::{RenameOperation, RenameOptions, RenameResult};

/// Errors that stop a rename run
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Invalid target directory: {0}")]
    InvalidRoot(#[from] ScanError),

    #[error("{renamed} files were renamed but history could not be saved: {source}")]
    HistoryInconsistent {
        renamed: usize,
        #[source]
        source: HistoryError,
    },

    #[error("Cancelled after {renamed} renames; no history was saved")]
    Cancelled { renamed: usize },
}

/// Rename `from` to `to` unless something already exists at `to`
pub(crate) fn rename_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    if fs::symlink_metadata(to).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination already exists: {}", to.display()),
        ));
    }
    fs::rename(from, to)
}

/// Rename every file under `root` according to `strategy`.
///
/// Per-file problems are reported and collected in the result; the run goes
/// on. Successful renames are appended to `store` as one batch once the walk
/// is over. A dry run reports what would happen and writes nothing.
pub fn run(
    root: &Path,
    strategy: &dyn NamingStrategy,
    options: &RenameOptions,
    store: &mut dyn HistoryStore,
    reporter: &mut Reporter,
) -> Result<RenameResult, RenameError> {
    let root = resolve_root(root)?;
    let batch_id = clock::new_batch_id();
    let operation = strategy.operation();

    info!(
        root = ?root,
        batch = %batch_id,
        operation = %operation,
        dry_run = options.dry_run,
        "Starting rename"
    );

    // A database kept inside the tree is skipped by path, never by name
    let filter = WalkFilter {
        reserved_name: store.reserved_file_name(),
        excluded_path: store.location().and_then(|p| fs::canonicalize(p).ok()),
    };

    // Collect first so renames cannot disturb the walk
    let entries: Vec<_> = walk_files(&root, filter).collect();
    debug!(count = entries.len(), "Walk complete");

    let mut result = RenameResult::new(batch_id.clone(), operation, options.dry_run);
    let mut indexes = IndexTable::default();
    let mut records: Vec<NewRecord> = Vec::new();

    for entry in entries {
        if options.cancel.is_cancelled() {
            warn!(renamed = records.len(), "Rename cancelled before history was written");
            return Err(RenameError::Cancelled {
                renamed: records.len(),
            });
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root.as_path()).to_path_buf();
                error!("Failed to read {:?}: {}", path, e);
                reporter.file_error(&path, &e.to_string());
                result.add_failure(path, e.to_string());
                continue;
            }
        };

        let Some(old_name) = entry.file_name.to_str() else {
            let reason = "file name is not valid UTF-8".to_string();
            warn!("Cannot name {:?}: {}", entry.path, reason);
            strategy.skip(&entry.path, &mut indexes);
            reporter.file_error(&entry.path, &reason);
            result.add_failure(entry.path.clone(), reason);
            continue;
        };

        let mut ctx = NamingContext::new(&entry.path, old_name, &mut indexes);
        let new_name = match strategy.compute_new_name(&mut ctx) {
            Ok(name) => name,
            Err(e) => {
                warn!("Cannot name {:?}: {}", entry.path, e);
                reporter.file_error(&entry.path, &e.to_string());
                result.add_failure(entry.path.clone(), e.to_string());
                continue;
            }
        };

        if new_name == old_name {
            trace!(name = %old_name, "Name unchanged");
            result.unchanged += 1;
            continue;
        }

        let op = RenameOperation::new(entry.path.clone(), new_name);

        if options.dry_run {
            reporter.planned(&op.source_path, &op.destination_path);
            result.add_operation(op);
            continue;
        }

        if let Err(e) = rename_no_clobber(&op.source_path, &op.destination_path) {
            error!(
                "Error renaming {:?} to {:?}: {}",
                op.source_path, op.destination_path, e
            );
            reporter.file_error(&op.source_path, &e.to_string());
            result.add_failure(op.source_path.clone(), e.to_string());
            continue;
        }

        info!("Renamed: {} -> {}", op.source_name, op.destination_name);
        reporter.renamed(&op.source_path, &op.destination_path);

        records.push(NewRecord {
            original_path: op.source_path.clone(),
            new_path: op.destination_path.clone(),
            operation,
            batch_id: batch_id.clone(),
            created_at: clock::now(),
        });
        result.add_operation(op);
    }

    if !records.is_empty() {
        store.append(&records).map_err(|source| {
            error!(
                "History write failed after {} renames; files and history now disagree",
                records.len()
            );
            RenameError::HistoryInconsistent {
                renamed: records.len(),
                source,
            }
        })?;

        info!(
            "Saved {} rename operations to history with batch ID {}",
            records.len(),
            batch_id
        );
    } else if !options.dry_run {
        info!("No files needed renaming");
    }

    Ok(result)
}
