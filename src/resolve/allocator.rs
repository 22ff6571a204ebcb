//! Identifier allocation

use crate::document::DocumentId;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mints globally unique document identifiers
pub trait IdAllocator: Send + Sync {
    fn allocate(&self) -> DocumentId;
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidAllocator;

impl IdAllocator for UuidAllocator {
    fn allocate(&self) -> DocumentId {
        DocumentId::new()
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... identifiers
///
/// Unique only within one allocator; meant for tests and reproducible runs.
#[derive(Debug)]
pub struct SequentialAllocator {
    prefix: String,
    next: AtomicUsize,
}

impl SequentialAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicUsize::new(1),
        }
    }

    /// Number of identifiers handed out so far
    pub fn allocated(&self) -> usize {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl IdAllocator for SequentialAllocator {
    fn allocate(&self) -> DocumentId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        DocumentId::from_string(format!("{}-{}", self.prefix, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up() {
        let alloc = SequentialAllocator::new("doc");
        assert_eq!(alloc.allocate().as_str(), "doc-1");
        assert_eq!(alloc.allocate().as_str(), "doc-2");
        assert_eq!(alloc.allocated(), 2);
    }

    #[test]
    fn uuid_ids_are_unique() {
        let alloc = UuidAllocator;
        assert_ne!(alloc.allocate(), alloc.allocate());
    }
}
