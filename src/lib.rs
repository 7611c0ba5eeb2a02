pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod output;
pub mod rename;
pub mod revert;
pub mod transform;
pub mod walker;

pub use config::HistoryLocation;
pub use error::{AppError, ExitCode};
pub use history::{
    BatchId, BatchState, BatchSummary, HistoryError, HistoryStore, MemoryStore, Operation,
    RenameRecord, SidecarStore, SqliteStore,
};
pub use output::Reporter;
pub use rename::{
    CancelToken, CleanStrategy, NamingStrategy, NumberStrategy, RenameError, RenameOptions,
    RenameResult,
};
pub use revert::{redo, undo, RevertDirection, RevertError, RevertOptions, RevertResult};
pub use transform::{clean_name, number_name, split_extension};
pub use walker::{resolve_root, walk_files, FileEntry, ScanError, WalkFilter};
