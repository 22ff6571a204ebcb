//! Storage trait definitions

use crate::document::{DocumentId, OwnerId, Tree};
use crate::import::{ContentWrite, PlaceholderWrite};
use crate::resolve::ExistingDocumentIndex;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A document as held by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub owner: OwnerId,
    pub title: String,
    /// `None` for a placeholder that never received content
    pub content: Option<Tree>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn is_placeholder(&self) -> bool {
        self.content.is_none()
    }
}

/// Trait for document persistence backends
///
/// Both upserts are keyed on `(owner, title)`, accept an empty slice as a
/// no-op and return the subset of records that committed. A record missing
/// from the result was rejected; the call as a whole only fails when the
/// backend is unusable.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create placeholder documents
    ///
    /// A placeholder never overwrites an existing document: when the key is
    /// taken, the existing document is left untouched and returned.
    async fn upsert_placeholders(
        &self,
        records: &[PlaceholderWrite],
    ) -> StorageResult<Vec<StoredDocument>>;

    /// Create documents or replace their content
    ///
    /// An existing document keeps its identifier; a new one gets a freshly
    /// allocated identifier.
    async fn upsert_content(&self, records: &[ContentWrite]) -> StorageResult<Vec<StoredDocument>>;

    /// Snapshot of an owner's titles and identifiers
    async fn load_index(&self, owner: &OwnerId) -> StorageResult<ExistingDocumentIndex> {
        let docs = self.list_documents(owner).await?;
        Ok(docs.into_iter().map(|d| (d.title, d.id)).collect())
    }

    /// All documents of an owner, oldest first
    async fn list_documents(&self, owner: &OwnerId) -> StorageResult<Vec<StoredDocument>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: DocumentStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
