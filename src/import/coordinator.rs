//! Batch import coordinator
//!
//! Pipeline for one batch:
//! 1. Derive each file's title, skipping files without one
//! 2. Parse, extract references, resolve them through one batch-wide
//!    resolver, rewrite the tree
//! 3. Upsert every placeholder for newly allocated identifiers
//! 4. Upsert every content document
//! 5. Report what committed
//!
//! Steps 3 and 4 are the only awaits, and run strictly in that order so that
//! content linking to a new document never commits before its target.
//!
//! Titles equal under case folding name one document. Every write for such a
//! title uses one spelling: the stored one when the owner already has the
//! document, otherwise the first batch file's.

use super::cancel::{CancellationToken, Checkpoint};
use super::intake::RawFile;
use super::records::{ContentWrite, PlaceholderWrite, WriteRecord};
use super::report::{ImportFailure, ImportReport};
use super::title::usable_title;
use crate::config::ImportConfig;
use crate::document::{DocumentId, OwnerId, Tree};
use crate::parse::DocumentParser;
use crate::resolve::{
    extract, retarget, rewrite, DocumentIndex, IdAllocator, IdentifierResolver, UuidAllocator,
};
use crate::storage::{DocumentStore, StorageResult, StoredDocument};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Write records for one batch, before anything is persisted
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    /// At most one per new title, in first-reference order
    pub placeholders: Vec<PlaceholderWrite>,
    /// One per importable file, in input order
    pub contents: Vec<ContentWrite>,
    pub skipped: usize,
    /// Files that could not be turned into a content write
    pub failures: Vec<ImportFailure>,
}

impl PreparedBatch {
    /// Every write in the order the store receives it
    pub fn records(&self) -> Vec<WriteRecord> {
        self.placeholders
            .iter()
            .cloned()
            .map(WriteRecord::from)
            .chain(self.contents.iter().cloned().map(WriteRecord::from))
            .collect()
    }
}

/// One spelling per case-folded title in a batch
struct TitleSpellings(HashMap<String, String>);

impl TitleSpellings {
    fn collect(files: &[RawFile], index: &dyn DocumentIndex) -> Self {
        let mut spellings = HashMap::new();
        for title in files.iter().filter_map(|f| usable_title(&f.name)) {
            let key = title.to_lowercase();
            if spellings.contains_key(&key) {
                continue;
            }
            let spelling = index.stored_title(&key).unwrap_or(title).to_string();
            spellings.insert(key, spelling);
        }
        Self(spellings)
    }

    /// Batch spelling of `title`, or `title` itself when no file defines it
    fn of(&self, title: &str) -> String {
        self.0
            .get(&title.to_lowercase())
            .cloned()
            .unwrap_or_else(|| title.to_string())
    }
}

/// Runs import batches against a document store
pub struct ImportCoordinator {
    store: Arc<dyn DocumentStore>,
    allocator: Arc<dyn IdAllocator>,
    parser: DocumentParser,
    cancel: CancellationToken,
}

impl ImportCoordinator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            allocator: Arc::new(UuidAllocator),
            parser: DocumentParser::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Allocator for identifiers of newly referenced documents
    pub fn with_allocator(mut self, allocator: Arc<dyn IdAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_parser(mut self, parser: DocumentParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_config(self, config: &ImportConfig) -> Self {
        self.with_parser(DocumentParser::from_config(config))
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Build the write records for `files` without touching the store
    ///
    /// Files are processed in order with one resolver, so a title referenced
    /// by several files gets one identifier and at most one placeholder.
    pub fn prepare(
        &self,
        files: &[RawFile],
        index: &dyn DocumentIndex,
        owner: &OwnerId,
    ) -> PreparedBatch {
        let mut batch = PreparedBatch::default();
        let mut resolver = IdentifierResolver::new(index, self.allocator.as_ref());
        let spellings = TitleSpellings::collect(files, index);

        for file in files {
            let Some(title) = usable_title(&file.name) else {
                debug!(name = %file.name, "skipping file without a title");
                batch.skipped += 1;
                continue;
            };
            let title = spellings.of(title);

            let mut tree = self.parser.parse(&file.text);
            if tree.is_empty() {
                tree = Tree::default_content();
            }

            let references = extract(&tree);
            let mut resolutions = Vec::with_capacity(references.len());
            for reference in references {
                let resolution = resolver.resolve(&reference.title);
                if resolution.is_new {
                    batch.placeholders.push(PlaceholderWrite {
                        id: resolution.id.clone(),
                        owner: owner.clone(),
                        title: spellings.of(&reference.title),
                    });
                }
                resolutions.push((reference.path, resolution.id));
            }

            match rewrite(&tree, &resolutions) {
                Ok(content) => {
                    debug!(%title, references = resolutions.len(), "prepared document");
                    batch.contents.push(ContentWrite {
                        owner: owner.clone(),
                        title,
                        content,
                    });
                }
                Err(e) => {
                    warn!(%title, error = %e, "could not finalize document");
                    batch.failures.push(ImportFailure::new(title, e.to_string()));
                }
            }
        }

        batch
    }

    /// Import `files` for `owner`, resolving references against `index`
    pub async fn import_batch(
        &self,
        files: &[RawFile],
        index: &dyn DocumentIndex,
        owner: &OwnerId,
    ) -> ImportReport {
        let PreparedBatch {
            placeholders,
            mut contents,
            skipped,
            failures,
        } = self.prepare(files, index, owner);
        let mut report = ImportReport {
            skipped,
            failures,
            ..Default::default()
        };

        if self.cancel.stops_at(Checkpoint::BeforePlaceholders) {
            return self.abandon(report, &contents, Checkpoint::BeforePlaceholders);
        }

        let committed = match self.store.upsert_placeholders(&placeholders).await {
            Ok(committed) => committed,
            Err(e) => {
                warn!(error = %e, count = placeholders.len(), "placeholder upsert failed");
                Vec::new()
            }
        };
        let remap = self.adopt_placeholders(&placeholders, committed, &mut report);
        if !remap.is_empty() {
            for write in &mut contents {
                retarget(&mut write.content, &remap);
            }
        }
        report.placeholders_created = report.placeholders.len();

        if self.cancel.stops_at(Checkpoint::BeforeContent) {
            return self.abandon(report, &contents, Checkpoint::BeforeContent);
        }

        report.documents = match self.store.upsert_content(&contents).await {
            Ok(committed) => {
                let keys: HashSet<(&OwnerId, &str)> =
                    committed.iter().map(|d| (&d.owner, d.title.as_str())).collect();
                for write in &contents {
                    if !keys.contains(&(&write.owner, write.title.as_str())) {
                        report
                            .failures
                            .push(ImportFailure::new(&write.title, "rejected by store"));
                    }
                }
                committed
            }
            Err(e) => {
                warn!(error = %e, count = contents.len(), "content upsert failed");
                let reason = format!("store error: {}", e);
                for write in &contents {
                    report
                        .failures
                        .push(ImportFailure::new(&write.title, reason.clone()));
                }
                Vec::new()
            }
        };

        report.committed = count_distinct(&report.placeholders, &report.documents);
        info!(
            owner = %owner,
            committed = report.committed,
            failed = report.failed(),
            skipped = report.skipped,
            placeholders = report.placeholders_created,
            "import batch finished"
        );
        report
    }

    /// Load `owner`'s index from the store, then import
    pub async fn import_for_owner(
        &self,
        files: &[RawFile],
        owner: &OwnerId,
    ) -> StorageResult<ImportReport> {
        let index = self.store.load_index(owner).await?;
        debug!(owner = %owner, existing = index.len(), "loaded existing-document index");
        Ok(self.import_batch(files, &index, owner).await)
    }

    /// Sort placeholder results into created documents and documents the
    /// store already held under that title
    ///
    /// Returns allocated id to stored id for the latter, so content can be
    /// pointed at a document that exists.
    fn adopt_placeholders(
        &self,
        writes: &[PlaceholderWrite],
        committed: Vec<StoredDocument>,
        report: &mut ImportReport,
    ) -> HashMap<DocumentId, DocumentId> {
        let allocated: HashMap<(&OwnerId, &str), &DocumentId> = writes
            .iter()
            .map(|w| ((&w.owner, w.title.as_str()), &w.id))
            .collect();

        let mut remap = HashMap::new();
        for doc in committed {
            let allocated_id = allocated.get(&(&doc.owner, doc.title.as_str())).copied();
            match allocated_id {
                Some(id) if *id != doc.id => {
                    warn!(
                        title = %doc.title,
                        allocated = %id,
                        stored = %doc.id,
                        "title already stored; linking to the stored document"
                    );
                    remap.insert(id.clone(), doc.id);
                }
                _ => report.placeholders.push(doc),
            }
        }
        remap
    }

    /// Stop at `checkpoint`; content not yet written counts as failed
    fn abandon(
        &self,
        mut report: ImportReport,
        contents: &[ContentWrite],
        checkpoint: Checkpoint,
    ) -> ImportReport {
        warn!(pending = contents.len(), %checkpoint, "import batch cancelled");
        for write in contents {
            report
                .failures
                .push(ImportFailure::new(&write.title, "cancelled"));
        }
        report.committed = count_distinct(&report.placeholders, &report.documents);
        report
    }
}

fn count_distinct(placeholders: &[StoredDocument], documents: &[StoredDocument]) -> usize {
    placeholders
        .iter()
        .chain(documents)
        .map(|d| (&d.owner, d.title.as_str()))
        .collect::<HashSet<_>>()
        .len()
}
