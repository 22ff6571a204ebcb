//! Notelink: batch note import with wiki-link resolution
//!
//! Imports a set of markdown-like text files as documents, resolving the
//! `[[Title]]` references between them to stable document identifiers.
//!
//! # Core Concepts
//!
//! - **Tree**: the typed document tree a file parses into
//! - **Reference**: a `[[Title]]` node, matched to documents case-insensitively
//! - **Placeholder**: a title-only document created for a reference whose
//!   target does not exist yet
//!
//! # Example
//!
//! ```
//! use notelink::{ExistingDocumentIndex, ImportCoordinator, MemoryStore, OwnerId, RawFile};
//! use std::sync::Arc;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let store = Arc::new(MemoryStore::new());
//!     let coordinator = ImportCoordinator::new(store);
//!     let files = vec![
//!         RawFile::new("A.md", "Links to [[B]]"),
//!         RawFile::new("B.md", "Plain text"),
//!     ];
//!     let report = coordinator
//!         .import_batch(&files, &ExistingDocumentIndex::new(), &OwnerId::new("me"))
//!         .await;
//!     assert_eq!(report.committed, 2);
//! });
//! ```

pub mod config;
pub mod document;
pub mod import;
pub mod parse;
pub mod resolve;
pub mod storage;

pub use config::{ConfigError, ImportConfig};
pub use document::{DocumentId, Node, OwnerId, Tree, TreePath};
pub use import::{
    collect_files, derive_title, CancellationToken, Checkpoint, ContentWrite, ImportCoordinator,
    ImportFailure, ImportReport, PlaceholderWrite, PreparedBatch, RawFile, WriteRecord,
};
pub use parse::{parse, DocumentParser};
pub use resolve::{
    extract, retarget, rewrite, DocumentIndex, ExistingDocumentIndex, ExtractedReference, IdAllocator,
    IdentifierResolver, Resolution, ResolutionCache, RewriteError, SequentialAllocator,
    UuidAllocator,
};
pub use storage::{
    DocumentStore, MemoryStore, OpenStore, SqliteStore, StorageError, StorageResult,
    StoredDocument,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
