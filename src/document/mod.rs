//! Document model: identifiers and the typed document tree

mod ids;
mod node;

pub use ids::{DocumentId, OwnerId};
pub use node::{Node, Tree, TreePath};
