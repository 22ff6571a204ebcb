//! Title → identifier resolution

use super::allocator::IdAllocator;
use super::index::DocumentIndex;
use crate::document::DocumentId;
use std::collections::HashMap;
use tracing::debug;

/// Outcome of resolving one title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub id: DocumentId,
    /// True when the identifier was freshly allocated; the caller owes exactly
    /// one placeholder write for it
    pub is_new: bool,
}

/// Batch-scoped memo of lower-cased title → identifier
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, DocumentId>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, title_lowercase: &str) -> Option<&DocumentId> {
        self.entries.get(title_lowercase)
    }

    pub fn insert(&mut self, title_lowercase: String, id: DocumentId) {
        self.entries.insert(title_lowercase, id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves reference titles for one import batch
///
/// Owns the batch's [`ResolutionCache`]; the index and allocator are borrowed.
/// Never issues writes.
pub struct IdentifierResolver<'a> {
    cache: ResolutionCache,
    index: &'a dyn DocumentIndex,
    allocator: &'a dyn IdAllocator,
}

impl<'a> IdentifierResolver<'a> {
    pub fn new(index: &'a dyn DocumentIndex, allocator: &'a dyn IdAllocator) -> Self {
        Self {
            cache: ResolutionCache::new(),
            index,
            allocator,
        }
    }

    /// Resolve `title`: cache first, then the existing-document index, then a
    /// fresh identifier. Matching is case-insensitive.
    pub fn resolve(&mut self, title: &str) -> Resolution {
        let key = title.to_lowercase();

        if let Some(id) = self.cache.get(&key) {
            return Resolution {
                id: id.clone(),
                is_new: false,
            };
        }

        if let Some(id) = self.index.lookup(&key) {
            debug!(title, %id, "reference matches existing document");
            self.cache.insert(key, id.clone());
            return Resolution { id, is_new: false };
        }

        let id = self.allocator.allocate();
        debug!(title, %id, "allocated identifier for new document");
        self.cache.insert(key, id.clone());
        Resolution { id, is_new: true }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{ExistingDocumentIndex, SequentialAllocator};

    #[test]
    fn new_title_is_allocated_once() {
        let index = ExistingDocumentIndex::new();
        let alloc = SequentialAllocator::new("id");
        let mut resolver = IdentifierResolver::new(&index, &alloc);

        let first = resolver.resolve("Topic");
        assert!(first.is_new);
        assert_eq!(first.id.as_str(), "id-1");

        let again = resolver.resolve("topic");
        assert!(!again.is_new);
        assert_eq!(again.id, first.id);

        let shouting = resolver.resolve("TOPIC");
        assert_eq!(shouting.id, first.id);
        assert_eq!(alloc.allocated(), 1);
    }

    #[test]
    fn existing_title_is_reused_in_any_case() {
        let index: ExistingDocumentIndex =
            [("Reading List", DocumentId::from("existing"))].into_iter().collect();
        let alloc = SequentialAllocator::new("id");
        let mut resolver = IdentifierResolver::new(&index, &alloc);

        let r = resolver.resolve("reading LIST");
        assert_eq!(
            r,
            Resolution {
                id: DocumentId::from("existing"),
                is_new: false
            }
        );
        assert_eq!(alloc.allocated(), 0);
        assert_eq!(resolver.cache().len(), 1);
    }

    #[test]
    fn cache_takes_precedence_over_index() {
        let index: ExistingDocumentIndex =
            [("a", DocumentId::from("from-index"))].into_iter().collect();
        let alloc = SequentialAllocator::new("id");
        let mut resolver = IdentifierResolver::new(&index, &alloc);
        resolver.cache.insert("a".into(), DocumentId::from("cached"));

        assert_eq!(resolver.resolve("A").id, DocumentId::from("cached"));
    }

    #[test]
    fn distinct_titles_get_distinct_ids() {
        let index = ExistingDocumentIndex::new();
        let alloc = SequentialAllocator::new("id");
        let mut resolver = IdentifierResolver::new(&index, &alloc);

        let a = resolver.resolve("A");
        let b = resolver.resolve("B");
        assert!(a.is_new && b.is_new);
        assert_ne!(a.id, b.id);
        assert_eq!(resolver.cache().len(), 2);
    }
}
