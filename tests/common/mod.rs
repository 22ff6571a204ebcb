//! Shared helpers for import integration tests

use notelink::{DocumentId, Node, OwnerId, Tree};

pub fn owner() -> OwnerId {
    OwnerId::new("user-1")
}

/// (title, target) of every reference in `tree`, in document order
pub fn reference_targets(tree: &Tree) -> Vec<(String, Option<DocumentId>)> {
    fn walk(node: &Node, out: &mut Vec<(String, Option<DocumentId>)>) {
        if let Node::Reference { title, target, .. } = node {
            out.push((title.clone(), target.clone()));
        }
        for child in node.children() {
            walk(child, out);
        }
    }
    let mut out = Vec::new();
    for node in &tree.children {
        walk(node, &mut out);
    }
    out
}

/// Node kinds in pre-order, for topology comparisons
pub fn shape(tree: &Tree) -> Vec<&'static str> {
    fn walk(node: &Node, out: &mut Vec<&'static str>) {
        out.push(node.kind());
        for child in node.children() {
            walk(child, out);
        }
    }
    let mut out = Vec::new();
    for node in &tree.children {
        walk(node, &mut out);
    }
    out
}
