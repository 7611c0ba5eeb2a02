mod engine;
mod strategy;
mod types;

pub(crate) use engine::rename_no_clobber;
pub use engine::{run, RenameError};
pub use strategy::{
    CleanStrategy, IndexTable, NamingContext, NamingError, NamingStrategy, NumberStrategy,
};
pub use types::{CancelToken, RenameFailure, RenameOperation, RenameOptions, RenameResult};
