//! Typed document tree

use super::ids::DocumentId;
use serde::{Deserialize, Serialize};

/// A node in a document tree
///
/// Container variants hold their children in document order. `Reference` is a
/// leaf: it names another document by title and, once resolved, carries that
/// document's identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Paragraph {
        children: Vec<Node>,
    },
    Heading {
        level: u8,
        children: Vec<Node>,
    },
    BlockQuote {
        children: Vec<Node>,
    },
    List {
        ordered: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        children: Vec<Node>,
    },
    ListItem {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
        children: Vec<Node>,
    },
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        code: String,
    },
    ThematicBreak,
    Emphasis {
        children: Vec<Node>,
    },
    Strong {
        children: Vec<Node>,
    },
    Strikethrough {
        children: Vec<Node>,
    },
    InlineCode {
        code: String,
    },
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        title: String,
        children: Vec<Node>,
    },
    Image {
        url: String,
        alt: String,
    },
    /// Wiki-link to another document
    Reference {
        /// Title used for matching (never the alias)
        title: String,
        /// Display text, when the link carried one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        /// Resolved target, absent until rewritten
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<DocumentId>,
    },
    Text {
        text: String,
    },
    SoftBreak,
    HardBreak,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    /// An unresolved reference
    pub fn reference(title: impl Into<String>, alias: Option<String>) -> Self {
        Node::Reference {
            title: title.into(),
            alias,
            target: None,
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    /// Snake-case name of the variant, matching the serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Paragraph { .. } => "paragraph",
            Node::Heading { .. } => "heading",
            Node::BlockQuote { .. } => "block_quote",
            Node::List { .. } => "list",
            Node::ListItem { .. } => "list_item",
            Node::CodeBlock { .. } => "code_block",
            Node::ThematicBreak => "thematic_break",
            Node::Emphasis { .. } => "emphasis",
            Node::Strong { .. } => "strong",
            Node::Strikethrough { .. } => "strikethrough",
            Node::InlineCode { .. } => "inline_code",
            Node::Link { .. } => "link",
            Node::Image { .. } => "image",
            Node::Reference { .. } => "reference",
            Node::Text { .. } => "text",
            Node::SoftBreak => "soft_break",
            Node::HardBreak => "hard_break",
        }
    }

    /// Child nodes (empty for leaves)
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::BlockQuote { children }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Strikethrough { children }
            | Node::Link { children, .. } => children,
            Node::CodeBlock { .. }
            | Node::ThematicBreak
            | Node::InlineCode { .. }
            | Node::Image { .. }
            | Node::Reference { .. }
            | Node::Text { .. }
            | Node::SoftBreak
            | Node::HardBreak => &[],
        }
    }

    /// Mutable child list, `None` for leaves
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::BlockQuote { children }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Strikethrough { children }
            | Node::Link { children, .. } => Some(children),
            Node::CodeBlock { .. }
            | Node::ThematicBreak
            | Node::InlineCode { .. }
            | Node::Image { .. }
            | Node::Reference { .. }
            | Node::Text { .. }
            | Node::SoftBreak
            | Node::HardBreak => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Node::Reference { .. })
    }

    /// Concatenated display text of this node and its descendants
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { text } => out.push_str(text),
            Node::InlineCode { code } | Node::CodeBlock { code, .. } => out.push_str(code),
            Node::Reference { title, alias, .. } => {
                out.push_str(alias.as_deref().unwrap_or(title));
            }
            Node::Image { alt, .. } => out.push_str(alt),
            Node::SoftBreak => out.push(' '),
            Node::HardBreak => out.push('\n'),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }
}

/// Position of a node as child indices from the tree root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Path of the `index`-th child of the node at this path
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// A document tree: an ordered list of block-level nodes under an implicit root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    pub children: Vec<Node>,
}

impl Tree {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Content given to a document that has no recognizable structure:
    /// a single empty paragraph
    pub fn default_content() -> Self {
        Self::new(vec![Node::paragraph(vec![Node::text("")])])
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes, excluding the implicit root
    pub fn node_count(&self) -> usize {
        self.children.iter().map(Node::node_count).sum()
    }

    /// Node at `path`, or `None` if the path leaves the tree
    pub fn node_at(&self, path: &TreePath) -> Option<&Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &TreePath) -> Option<&mut Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for index in rest {
            node = node.children_mut()?.get_mut(*index)?;
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        Tree::new(vec![
            Node::Heading {
                level: 1,
                children: vec![Node::text("Title")],
            },
            Node::paragraph(vec![
                Node::text("see "),
                Node::reference("Other", Some("there".into())),
            ]),
        ])
    }

    #[test]
    fn node_at_follows_child_indices() {
        let tree = sample();
        let node = tree.node_at(&TreePath::from_indices(vec![1, 1])).unwrap();
        assert!(node.is_reference());
        assert!(tree.node_at(&TreePath::from_indices(vec![1, 5])).is_none());
        assert!(tree.node_at(&TreePath::root()).is_none());
    }

    #[test]
    fn node_at_does_not_descend_into_leaves() {
        let tree = sample();
        assert!(tree
            .node_at(&TreePath::from_indices(vec![1, 1, 0]))
            .is_none());
    }

    #[test]
    fn node_count_excludes_root() {
        assert_eq!(sample().node_count(), 5);
        assert_eq!(Tree::default_content().node_count(), 2);
    }

    #[test]
    fn plain_text_prefers_alias() {
        let tree = sample();
        assert_eq!(tree.children[1].plain_text(), "see there");
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json[0]["type"], "heading");
        assert_eq!(json[1]["children"][1]["type"], "reference");
        assert_eq!(json[1]["children"][1]["title"], "Other");
        assert!(json[1]["children"][1].get("target").is_none());

        let back: Tree = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn kind_matches_serialized_tag() {
        let node = Node::ThematicBreak;
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], node.kind());
    }

    #[test]
    fn path_display() {
        assert_eq!(TreePath::root().child(2).child(0).to_string(), "[2, 0]");
    }
}
