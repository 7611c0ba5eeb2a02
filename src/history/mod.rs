mod memory;
mod sidecar;
mod sqlite;
mod store;
mod types;

pub use memory::MemoryStore;
pub use sidecar::{SidecarStore, SIDECAR_FILE};
pub use sqlite::{default_db_path, SqliteStore, DB_FILE};
pub use store::{HistoryError, HistoryStore};
pub use types::*;
