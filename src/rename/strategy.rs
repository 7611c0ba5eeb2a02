use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::history::Operation;
use crate::transform::{clean_name, cleaned_stem_is_empty, number_name};

/// Errors a naming strategy can report for a single file
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NamingError {
    #[error("'{0}' has no usable characters left after cleaning")]
    EmptyName(String),
}

/// Sequence counters for one engine run.
///
/// `None` is the tree-wide counter; `Some(dir)` counts within one directory.
#[derive(Debug, Default)]
pub struct IndexTable {
    counters: HashMap<Option<PathBuf>, usize>,
}

impl IndexTable {
    /// Advance and return the 1-based index for `scope`
    pub fn next(&mut self, scope: Option<&Path>) -> usize {
        let counter = self
            .counters
            .entry(scope.map(Path::to_path_buf))
            .or_insert(0);
        *counter += 1;
        *counter
    }
}

/// What a strategy gets to see about the file being named
pub struct NamingContext<'a> {
    pub path: &'a Path,
    pub file_name: &'a str,
    indexes: &'a mut IndexTable,
}

impl<'a> NamingContext<'a> {
    pub fn new(path: &'a Path, file_name: &'a str, indexes: &'a mut IndexTable) -> Self {
        Self {
            path,
            file_name,
            indexes,
        }
    }

    /// Directory holding the file
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Next index, either per directory or across the whole tree
    pub fn next_index(&mut self, per_directory: bool) -> usize {
        if per_directory {
            let dir = self.directory().to_path_buf();
            self.indexes.next(Some(&dir))
        } else {
            self.indexes.next(None)
        }
    }
}

/// Rule that turns a file's current name into its new one
pub trait NamingStrategy {
    /// Operation recorded in history for renames made by this strategy
    fn operation(&self) -> Operation;

    fn compute_new_name(&self, ctx: &mut NamingContext<'_>) -> Result<String, NamingError>;

    /// Account for a file at `path` that cannot be named at all, so later
    /// files keep the numbers they would otherwise get
    fn skip(&self, _path: &Path, _indexes: &mut IndexTable) {}
}

/// Canonicalizes names with [`clean_name`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanStrategy;

impl NamingStrategy for CleanStrategy {
    fn operation(&self) -> Operation {
        Operation::Clean
    }

    fn compute_new_name(&self, ctx: &mut NamingContext<'_>) -> Result<String, NamingError> {
        if cleaned_stem_is_empty(ctx.file_name) {
            return Err(NamingError::EmptyName(ctx.file_name.to_string()));
        }
        Ok(clean_name(ctx.file_name))
    }
}

/// Prefixes names with a zero-padded sequence number
#[derive(Debug, Clone, Copy)]
pub struct NumberStrategy {
    pub digits: usize,
    pub hierarchical: bool,
}

impl NumberStrategy {
    pub fn new(digits: usize, hierarchical: bool) -> Self {
        Self {
            digits,
            hierarchical,
        }
    }
}

impl NamingStrategy for NumberStrategy {
    fn operation(&self) -> Operation {
        Operation::Number
    }

    fn compute_new_name(&self, ctx: &mut NamingContext<'_>) -> Result<String, NamingError> {
        let index = ctx.next_index(self.hierarchical);
        Ok(number_name(ctx.file_name, self.digits, index))
    }

    fn skip(&self, path: &Path, indexes: &mut IndexTable) {
        NamingContext::new(path, "", indexes).next_index(self.hierarchical);
    }
}
