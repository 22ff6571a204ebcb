//! Aggregate outcome of an import batch

use crate::storage::StoredDocument;
use serde::Serialize;

/// Why one file did not commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub title: String,
    pub reason: String,
}

impl ImportFailure {
    pub fn new(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            reason: reason.into(),
        }
    }
}

/// Result of [`ImportCoordinator::import_batch`](super::ImportCoordinator::import_batch)
///
/// Partial success is normal: whatever committed stays committed, and files
/// that did not are listed in `failures`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Distinct documents, by `(owner, title)`, committed by either call
    pub committed: usize,
    /// Files skipped for lack of a usable title; counted neither as
    /// committed nor as failed
    pub skipped: usize,
    /// Placeholder documents the store accepted
    pub placeholders_created: usize,
    /// One entry per attempted file that did not commit
    pub failures: Vec<ImportFailure>,
    /// Committed placeholder documents, as returned by the store
    pub placeholders: Vec<StoredDocument>,
    /// Committed content documents, as returned by the store
    pub documents: Vec<StoredDocument>,
}

impl ImportReport {
    /// Number of attempted files that failed to commit
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_fully_committed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Committed content document with the given title
    pub fn document(&self, title: &str) -> Option<&StoredDocument> {
        self.documents.iter().find(|d| d.title == title)
    }

    /// One-line message for the user
    pub fn summary(&self) -> String {
        match self.committed {
            0 => "No notes were imported.".to_string(),
            1 => "1 note was successfully imported.".to_string(),
            n => format!("{} notes were successfully imported.", n),
        }
    }
}
