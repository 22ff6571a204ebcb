//! Batch import of raw documents
//!
//! Turns a set of files into write records, resolving wiki-links between
//! them and against the owner's existing documents, then persists the records
//! through a [`DocumentStore`](crate::storage::DocumentStore): placeholders for
//! newly referenced documents first, then the imported content.

mod cancel;
mod coordinator;
mod intake;
mod records;
mod report;
mod title;

pub use cancel::{CancellationToken, Checkpoint};
pub use coordinator::{ImportCoordinator, PreparedBatch};
pub use intake::{collect_files, RawFile};
pub use records::{ContentWrite, PlaceholderWrite, WriteRecord};
pub use report::{ImportFailure, ImportReport};
pub use title::{derive_title, usable_title};
