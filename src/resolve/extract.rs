//! Reference extraction

use crate::document::{Node, Tree, TreePath};

/// A reference found in a tree: the target title and where the node sits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedReference {
    pub title: String,
    pub path: TreePath,
}

/// Every reference node of `tree`, in document order
///
/// Depth-first pre-order, matching render order. Each node is visited once.
pub fn extract(tree: &Tree) -> Vec<ExtractedReference> {
    let mut found = Vec::new();
    let root = TreePath::root();
    for (i, node) in tree.children.iter().enumerate() {
        visit(node, root.child(i), &mut found);
    }
    found
}

fn visit(node: &Node, path: TreePath, found: &mut Vec<ExtractedReference>) {
    if let Node::Reference { title, .. } = node {
        found.push(ExtractedReference {
            title: title.clone(),
            path: path.clone(),
        });
    }
    for (i, child) in node.children().iter().enumerate() {
        visit(child, path.child(i), found);
    }
}
