//! Cross-reference resolution
//!
//! Turns the title-only references of a parsed tree into references to stable
//! document identifiers:
//!
//! - [`extract`]: list every reference with its position in the tree
//! - [`IdentifierResolver`]: map a title to an identifier using the batch
//!   cache, then the existing-document index, then a fresh allocation
//! - [`rewrite`]: write the identifiers back onto the reference nodes

mod allocator;
mod extract;
mod index;
mod resolver;
mod rewrite;

pub use allocator::{IdAllocator, SequentialAllocator, UuidAllocator};
pub use extract::{extract, ExtractedReference};
pub use index::{DocumentIndex, ExistingDocumentIndex};
pub use resolver::{IdentifierResolver, Resolution, ResolutionCache};
pub use rewrite::{retarget, rewrite, RewriteError};
