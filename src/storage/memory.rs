//! In-memory storage backend

use super::traits::{DocumentStore, StorageError, StorageResult, StoredDocument};
use crate::document::OwnerId;
use crate::import::{ContentWrite, PlaceholderWrite};
use crate::resolve::{IdAllocator, UuidAllocator};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone)]
struct Entry {
    doc: StoredDocument,
    /// Insertion order, for stable listing
    seq: u64,
}

/// `DashMap`-backed document store
///
/// Titles registered with [`reject_title`](MemoryStore::reject_title) are
/// refused by both upserts, and [`set_unavailable`](MemoryStore::set_unavailable)
/// makes every call fail; both simulate a misbehaving backend.
pub struct MemoryStore {
    documents: DashMap<(OwnerId, String), Entry>,
    next_seq: AtomicU64,
    rejected: DashSet<String>,
    unavailable: AtomicBool,
    allocator: Arc<dyn IdAllocator>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_allocator(Arc::new(UuidAllocator))
    }

    /// Use `allocator` for identifiers of documents first created by content
    pub fn with_allocator(allocator: Arc<dyn IdAllocator>) -> Self {
        Self {
            documents: DashMap::new(),
            next_seq: AtomicU64::new(0),
            rejected: DashSet::new(),
            unavailable: AtomicBool::new(false),
            allocator,
        }
    }

    /// Refuse every future write of `title`
    pub fn reject_title(&self, title: impl Into<String>) {
        self.rejected.insert(title.into());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Number of documents across all owners
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up a document by its exact key
    pub fn get(&self, owner: &OwnerId, title: &str) -> Option<StoredDocument> {
        self.documents
            .get(&(owner.clone(), title.to_string()))
            .map(|e| e.doc.clone())
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "store unavailable",
            )));
        }
        Ok(())
    }

    fn accepts(&self, title: &str) -> bool {
        if self.rejected.contains(title) {
            warn!(title, "write rejected by store");
            return false;
        }
        true
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upsert_placeholders(
        &self,
        records: &[PlaceholderWrite],
    ) -> StorageResult<Vec<StoredDocument>> {
        self.check_available()?;

        let mut committed = Vec::with_capacity(records.len());
        for record in records {
            if !self.accepts(&record.title) {
                continue;
            }
            let key = (record.owner.clone(), record.title.clone());
            let entry = self.documents.entry(key).or_insert_with(|| Entry {
                doc: StoredDocument {
                    id: record.id.clone(),
                    owner: record.owner.clone(),
                    title: record.title.clone(),
                    content: None,
                    updated_at: Utc::now(),
                },
                seq: self.next_seq(),
            });
            committed.push(entry.doc.clone());
        }
        Ok(committed)
    }

    async fn upsert_content(&self, records: &[ContentWrite]) -> StorageResult<Vec<StoredDocument>> {
        self.check_available()?;

        let mut committed = Vec::with_capacity(records.len());
        for record in records {
            if !self.accepts(&record.title) {
                continue;
            }
            let key = (record.owner.clone(), record.title.clone());
            let mut entry = self.documents.entry(key).or_insert_with(|| Entry {
                doc: StoredDocument {
                    id: self.allocator.allocate(),
                    owner: record.owner.clone(),
                    title: record.title.clone(),
                    content: None,
                    updated_at: Utc::now(),
                },
                seq: self.next_seq(),
            });
            entry.doc.content = Some(record.content.clone());
            entry.doc.updated_at = Utc::now();
            committed.push(entry.doc.clone());
        }
        Ok(committed)
    }

    async fn list_documents(&self, owner: &OwnerId) -> StorageResult<Vec<StoredDocument>> {
        self.check_available()?;

        let mut entries: Vec<Entry> = self
            .documents
            .iter()
            .filter(|e| &e.key().0 == owner)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by_key(|e| e.seq);
        Ok(entries.into_iter().map(|e| e.doc).collect())
    }
}
