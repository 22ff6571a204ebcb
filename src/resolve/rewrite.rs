//! Applying resolved identifiers to a tree

use crate::document::{DocumentId, Node, Tree, TreePath};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from [`rewrite`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewriteError {
    #[error("path {0} does not exist in the tree")]
    InvalidPath(TreePath),

    #[error("node at {path} is a {kind}, not a reference")]
    NotAReference { path: TreePath, kind: &'static str },

    #[error("reference to '{title}' at {path} has no identifier")]
    Unresolved { title: String, path: TreePath },
}

/// Return a copy of `tree` with each resolution's identifier set on the
/// reference node at its path
///
/// Paths address the input topology, which the output shares: no node is
/// added, removed or reordered. Fails if any reference is left without an
/// identifier.
pub fn rewrite(tree: &Tree, resolutions: &[(TreePath, DocumentId)]) -> Result<Tree, RewriteError> {
    let mut out = tree.clone();

    for (path, id) in resolutions {
        let node = out
            .node_at_mut(path)
            .ok_or_else(|| RewriteError::InvalidPath(path.clone()))?;
        match node {
            Node::Reference { target, .. } => *target = Some(id.clone()),
            other => {
                return Err(RewriteError::NotAReference {
                    path: path.clone(),
                    kind: other.kind(),
                })
            }
        }
    }

    for (i, node) in out.children.iter().enumerate() {
        check_resolved(node, TreePath::root().child(i))?;
    }
    Ok(out)
}

fn check_resolved(node: &Node, path: TreePath) -> Result<(), RewriteError> {
    match node {
        Node::Reference { title, target, .. } => match target {
            Some(id) if !id.as_str().is_empty() => Ok(()),
            _ => Err(RewriteError::Unresolved {
                title: title.clone(),
                path,
            }),
        },
        _ => {
            for (i, child) in node.children().iter().enumerate() {
                check_resolved(child, path.child(i))?;
            }
            Ok(())
        }
    }
}

/// Replace reference targets found in `remap`, in place
///
/// Returns how many references changed.
pub fn retarget(tree: &mut Tree, remap: &HashMap<DocumentId, DocumentId>) -> usize {
    tree.children
        .iter_mut()
        .map(|node| retarget_node(node, remap))
        .sum()
}

fn retarget_node(node: &mut Node, remap: &HashMap<DocumentId, DocumentId>) -> usize {
    if let Node::Reference {
        target: Some(id), ..
    } = node
    {
        return match remap.get(id) {
            Some(replacement) => {
                *id = replacement.clone();
                1
            }
            None => 0,
        };
    }
    match node.children_mut() {
        Some(children) => children
            .iter_mut()
            .map(|child| retarget_node(child, remap))
            .sum(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::resolve::extract;

    fn resolve_all(tree: &Tree) -> Vec<(TreePath, DocumentId)> {
        extract(tree)
            .into_iter()
            .map(|r| (r.path, DocumentId::from_string(format!("id:{}", r.title))))
            .collect()
    }

    fn kinds(node: &Node, out: &mut Vec<&'static str>) {
        out.push(node.kind());
        for child in node.children() {
            kinds(child, out);
        }
    }

    fn shape(tree: &Tree) -> Vec<&'static str> {
        let mut out = Vec::new();
        for node in &tree.children {
            kinds(node, &mut out);
        }
        out
    }

    #[test]
    fn sets_targets_and_preserves_topology() {
        let tree = parse("# T [[A]]\n\n- [[B|bee]]\n- text\n\n> [[A]]\n");
        let resolutions = resolve_all(&tree);
        let out = rewrite(&tree, &resolutions).unwrap();

        assert_eq!(out.node_count(), tree.node_count());
        assert_eq!(shape(&out), shape(&tree));

        for (path, id) in &resolutions {
            match out.node_at(path).unwrap() {
                Node::Reference { target, .. } => assert_eq!(target.as_ref(), Some(id)),
                other => panic!("expected reference, got {:?}", other),
            }
        }

        match out.node_at(&resolutions[1].0).unwrap() {
            Node::Reference { title, alias, .. } => {
                assert_eq!(title, "B");
                assert_eq!(alias.as_deref(), Some("bee"));
            }
            other => panic!("expected reference, got {:?}", other),
        }
    }

    #[test]
    fn input_tree_is_unchanged() {
        let tree = parse("[[A]]");
        let before = tree.clone();
        rewrite(&tree, &resolve_all(&tree)).unwrap();
        assert_eq!(tree, before);
    }

    #[test]
    fn tree_without_references_is_returned_as_is() {
        let tree = parse("nothing to see");
        assert_eq!(rewrite(&tree, &[]).unwrap(), tree);
    }

    #[test]
    fn invalid_path() {
        let tree = parse("[[A]]");
        let err = rewrite(&tree, &[(TreePath::from_indices(vec![4]), DocumentId::from("x"))])
            .unwrap_err();
        assert!(matches!(err, RewriteError::InvalidPath(_)));
    }

    #[test]
    fn path_to_non_reference() {
        let tree = parse("[[A]]");
        let err = rewrite(&tree, &[(TreePath::from_indices(vec![0]), DocumentId::from("x"))])
            .unwrap_err();
        assert_eq!(
            err,
            RewriteError::NotAReference {
                path: TreePath::from_indices(vec![0]),
                kind: "paragraph"
            }
        );
    }

    #[test]
    fn missing_resolution_is_an_error() {
        let tree = parse("[[A]] [[B]]");
        let mut resolutions = resolve_all(&tree);
        resolutions.pop();
        let err = rewrite(&tree, &resolutions).unwrap_err();
        assert!(matches!(err, RewriteError::Unresolved { title, .. } if title == "B"));
    }

    #[test]
    fn retarget_replaces_only_mapped_ids() {
        let tree = parse("[[A]]\n\n> nested [[B]] and [[A|again]]\n");
        let mut out = rewrite(&tree, &resolve_all(&tree)).unwrap();
        let remap: HashMap<_, _> = [(DocumentId::from("id:A"), DocumentId::from("stored-a"))]
            .into_iter()
            .collect();

        assert_eq!(retarget(&mut out, &remap), 2);
        let targets: Vec<_> = extract(&out)
            .into_iter()
            .map(|r| match out.node_at(&r.path) {
                Some(Node::Reference { target, .. }) => target.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(
            targets,
            vec![
                Some(DocumentId::from("stored-a")),
                Some(DocumentId::from("id:B")),
                Some(DocumentId::from("stored-a")),
            ]
        );
        assert_eq!(shape(&out), shape(&tree));
    }
}
