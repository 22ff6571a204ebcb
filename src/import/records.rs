//! Write records produced by an import batch
//!
//! Both kinds are upserted on `(owner, title)`.

use crate::document::{DocumentId, OwnerId, Tree};
use serde::{Deserialize, Serialize};

/// Creates a document with identity and title only, so that references to
/// it can be committed before its real content exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderWrite {
    pub id: DocumentId,
    pub owner: OwnerId,
    pub title: String,
}

/// Creates or replaces the content of an imported document
///
/// Carries no identifier: an existing document with the same
/// `(owner, title)` keeps its own, otherwise the store allocates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentWrite {
    pub owner: OwnerId,
    pub title: String,
    pub content: Tree,
}

/// Either kind of write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WriteRecord {
    Placeholder(PlaceholderWrite),
    Content(ContentWrite),
}

impl WriteRecord {
    pub fn owner(&self) -> &OwnerId {
        match self {
            WriteRecord::Placeholder(p) => &p.owner,
            WriteRecord::Content(c) => &c.owner,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            WriteRecord::Placeholder(p) => &p.title,
            WriteRecord::Content(c) => &c.title,
        }
    }
}

impl From<PlaceholderWrite> for WriteRecord {
    fn from(p: PlaceholderWrite) -> Self {
        WriteRecord::Placeholder(p)
    }
}

impl From<ContentWrite> for WriteRecord {
    fn from(c: ContentWrite) -> Self {
        WriteRecord::Content(c)
    }
}
