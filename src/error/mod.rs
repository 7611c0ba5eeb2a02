mod codes;

pub use codes::ExitCode;

use crate::history::HistoryError;
use crate::rename::RenameError;
use crate::revert::RevertError;
use crate::walker::ScanError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Target directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("{0}")]
    Usage(String),

    #[error("no operation to undo")]
    NothingToUndo,

    #[error("no operation to redo")]
    NothingToRedo,

    #[error("{failed} files could not be renamed")]
    PartialFailure { failed: usize },

    #[error("Renamed {renamed} files but failed to record them: {source}")]
    HistoryInconsistent {
        renamed: usize,
        #[source]
        source: HistoryError,
    },

    #[error("History unavailable: {source}")]
    HistoryUnavailable {
        path: Option<PathBuf>,
        #[source]
        source: HistoryError,
    },

    #[error("Cancelled after {renamed} renames")]
    Cancelled { renamed: usize },

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::DirectoryNotFound { .. }
            | AppError::NotADirectory { .. }
            | AppError::PermissionDenied { .. }
            | AppError::Usage(_) => ExitCode::InvalidUsage,
            AppError::NothingToUndo | AppError::NothingToRedo => ExitCode::NoOperation,
            AppError::PartialFailure { .. } => ExitCode::PartialFailure,
            AppError::HistoryInconsistent { .. }
            | AppError::HistoryUnavailable { .. }
            | AppError::Cancelled { .. }
            | AppError::Other(_) => ExitCode::Fatal,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            AppError::DirectoryNotFound { path } => {
                format!(
                    "The specified directory does not exist:\n  {}\n\n\
                     Please verify the path and try again.",
                    path.display()
                )
            }

            AppError::NotADirectory { path } => {
                format!(
                    "The specified path is not a directory:\n  {}\n\n\
                     Please provide a valid directory path.",
                    path.display()
                )
            }

            AppError::PermissionDenied { path } => {
                format!(
                    "Permission denied when accessing:\n  {}\n\n\
                     Please check file permissions or run with appropriate privileges.",
                    path.display()
                )
            }

            AppError::Usage(message) => message.clone(),

            AppError::NothingToUndo => "no operation to undo".to_string(),

            AppError::NothingToRedo => "no operation to redo".to_string(),

            AppError::PartialFailure { failed } => {
                format!(
                    "{} files could not be renamed; the rest of the batch was applied.\n\
                     See the messages above for details.",
                    failed
                )
            }

            AppError::HistoryInconsistent { renamed, source } => {
                format!(
                    "{} files were renamed but the history could not be saved:\n  {}\n\n\
                     These renames cannot be undone with this tool.\n\
                     Check the messages above for the list of renamed files.",
                    renamed, source
                )
            }

            AppError::HistoryUnavailable { path, source } => {
                let path_info = path
                    .as_ref()
                    .map(|p| format!("File: {}\n", p.display()))
                    .unwrap_or_default();

                format!(
                    "Could not open the rename history:\n  {}\n{}\n\
                     Check that the file is readable and not in use by another process.",
                    source, path_info
                )
            }

            AppError::Cancelled { renamed } => {
                format!(
                    "Cancelled after {} renames.\n\
                     No history was saved for this run.",
                    renamed
                )
            }

            AppError::Other(message) => message.clone(),
        }
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::PathNotFound(path) => AppError::DirectoryNotFound { path },
            ScanError::NotADirectory(path) => AppError::NotADirectory { path },
            ScanError::PermissionDenied(path) => AppError::PermissionDenied { path },
            ScanError::IoError(e) => AppError::Other(format!("I/O error: {}", e)),
            ScanError::Walk(e) => AppError::Other(format!("I/O error: {}", e)),
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::HistoryUnavailable {
            path: None,
            source: err,
        }
    }
}

impl From<RenameError> for AppError {
    fn from(err: RenameError) -> Self {
        match err {
            RenameError::InvalidRoot(e) => e.into(),
            RenameError::HistoryInconsistent { renamed, source } => {
                AppError::HistoryInconsistent { renamed, source }
            }
            RenameError::Cancelled { renamed } => AppError::Cancelled { renamed },
        }
    }
}

impl From<RevertError> for AppError {
    fn from(err: RevertError) -> Self {
        match err {
            RevertError::NothingToUndo => AppError::NothingToUndo,
            RevertError::NothingToRedo => AppError::NothingToRedo,
            RevertError::History(e) => e.into(),
        }
    }
}
