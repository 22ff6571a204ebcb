//! Existing-document index

use crate::document::DocumentId;
use std::collections::HashMap;

/// Read-only lookup of already persisted documents by title
pub trait DocumentIndex: Send + Sync {
    /// Identifier of the document whose lower-cased title equals
    /// `title_lowercase`
    fn lookup(&self, title_lowercase: &str) -> Option<DocumentId>;

    /// Title as stored for that document, when the index keeps it
    fn stored_title(&self, _title_lowercase: &str) -> Option<&str> {
        None
    }
}

/// Snapshot of one owner's documents, keyed case-insensitively by title
///
/// When two titles differ only by case, the first one inserted wins.
#[derive(Debug, Clone, Default)]
pub struct ExistingDocumentIndex {
    by_title: HashMap<String, (String, DocumentId)>,
}

impl ExistingDocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document unless a title equal under case folding is present
    pub fn insert(&mut self, title: &str, id: DocumentId) {
        self.by_title
            .entry(title.to_lowercase())
            .or_insert_with(|| (title.to_string(), id));
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }
}

impl<T: AsRef<str>> FromIterator<(T, DocumentId)> for ExistingDocumentIndex {
    fn from_iter<I: IntoIterator<Item = (T, DocumentId)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (title, id) in iter {
            index.insert(title.as_ref(), id);
        }
        index
    }
}

impl DocumentIndex for ExistingDocumentIndex {
    fn lookup(&self, title_lowercase: &str) -> Option<DocumentId> {
        self.by_title.get(title_lowercase).map(|(_, id)| id.clone())
    }

    fn stored_title(&self, title_lowercase: &str) -> Option<&str> {
        self.by_title.get(title_lowercase).map(|(title, _)| title.as_str())
    }
}
