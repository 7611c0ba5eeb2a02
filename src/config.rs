use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;
use crate::history::{default_db_path, HistoryStore, SidecarStore, SqliteStore, SIDECAR_FILE};

/// Where a command reads and writes its history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryLocation {
    /// SQLite database file
    Database(PathBuf),
    /// JSON sidecar at the root of a tree
    Sidecar(PathBuf),
}

impl HistoryLocation {
    /// Pick the history location from the command line.
    ///
    /// `sidecar` wins over `db_override`; without either the database in the
    /// home directory is used.
    pub fn resolve(
        db_override: Option<&Path>,
        sidecar: bool,
        root: Option<&Path>,
    ) -> Result<Self, AppError> {
        if sidecar {
            let root = root.ok_or_else(|| {
                AppError::Usage("--sidecar requires --path".to_string())
            })?;
            return Ok(HistoryLocation::Sidecar(root.join(SIDECAR_FILE)));
        }

        match db_override {
            Some(path) => Ok(HistoryLocation::Database(path.to_path_buf())),
            None => {
                let path = default_db_path()?;
                Ok(HistoryLocation::Database(path))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            HistoryLocation::Database(path) | HistoryLocation::Sidecar(path) => path,
        }
    }

    /// Open the store at this location
    pub fn open(&self) -> Result<Box<dyn HistoryStore>, AppError> {
        info!("Using history file: {:?}", self.path());

        let store: Result<Box<dyn HistoryStore>, _> = match self {
            HistoryLocation::Database(path) => {
                SqliteStore::open(path).map(|s| Box::new(s) as Box<dyn HistoryStore>)
            }
            HistoryLocation::Sidecar(path) => {
                SidecarStore::load(path.clone()).map(|s| Box::new(s) as Box<dyn HistoryStore>)
            }
        };

        store.map_err(|source| AppError::HistoryUnavailable {
            path: Some(self.path().to_path_buf()),
            source,
        })
    }
}
