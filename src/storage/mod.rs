//! Storage backends
//!
//! The import engine persists through the [`DocumentStore`] trait.
//! `SqliteStore` is the persistent implementation; `MemoryStore` keeps
//! everything in process.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{DocumentStore, OpenStore, StorageError, StorageResult, StoredDocument};
