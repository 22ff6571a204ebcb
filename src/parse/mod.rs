//! Document parser
//!
//! Turns raw markdown-like text into a [`Tree`]. Block and inline structure
//! comes from pulldown-cmark; wiki-link tokens are recognized in the text it
//! produces. Parsing never fails: constructs without a dedicated node kind
//! degrade to plain text or are flattened into their parent.

mod wikilink;

use crate::config::ImportConfig;
use crate::document::{Node, Tree};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

/// Parse `raw` with the default alias divider (`|`)
pub fn parse(raw: &str) -> Tree {
    DocumentParser::new().parse(raw)
}

/// Markdown parser with wiki-link support
#[derive(Debug, Clone)]
pub struct DocumentParser {
    alias_divider: char,
    options: Options,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser {
    pub fn new() -> Self {
        Self {
            alias_divider: '|',
            options: Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS,
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new().with_alias_divider(config.alias_divider)
    }

    pub fn with_alias_divider(mut self, divider: char) -> Self {
        self.alias_divider = divider;
        self
    }

    pub fn alias_divider(&self) -> char {
        self.alias_divider
    }

    /// Parse a document into a tree of block-level nodes
    pub fn parse(&self, raw: &str) -> Tree {
        let mut stack = vec![Frame::new(FrameKind::Root)];

        for event in Parser::new_ext(raw, self.options) {
            match event {
                Event::Start(tag) => {
                    if let Some(top) = stack.last_mut() {
                        top.flush(self.alias_divider);
                    }
                    stack.push(Frame::new(FrameKind::from_tag(tag)));
                }
                Event::End(_) => {
                    // The root frame is never closed by an event
                    if stack.len() > 1 {
                        self.close_top(&mut stack);
                    }
                }
                Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(&text);
                    }
                }
                Event::Code(code) => self.push_node(
                    &mut stack,
                    Node::InlineCode {
                        code: code.to_string(),
                    },
                ),
                Event::FootnoteReference(label) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(&format!("[^{}]", label));
                    }
                }
                Event::SoftBreak => self.push_node(&mut stack, Node::SoftBreak),
                Event::HardBreak => self.push_node(&mut stack, Node::HardBreak),
                Event::Rule => self.push_node(&mut stack, Node::ThematicBreak),
                Event::TaskListMarker(checked) => {
                    if let Some(item) = stack
                        .iter_mut()
                        .rev()
                        .find(|f| matches!(f.kind, FrameKind::Item))
                    {
                        item.checked = Some(checked);
                    }
                }
            }
        }

        // Close anything left open so no content is lost
        while stack.len() > 1 {
            self.close_top(&mut stack);
        }

        let mut root = stack.pop().unwrap_or_else(|| Frame::new(FrameKind::Root));
        root.flush(self.alias_divider);
        Tree::new(root.children)
    }

    fn push_node(&self, stack: &mut [Frame], node: Node) {
        if let Some(top) = stack.last_mut() {
            top.flush(self.alias_divider);
            top.children.push(node);
        }
    }

    fn close_top(&self, stack: &mut Vec<Frame>) {
        let Some(frame) = stack.pop() else {
            return;
        };
        let nodes = frame.finish(self.alias_divider);
        if let Some(parent) = stack.last_mut() {
            parent.flush(self.alias_divider);
            parent.children.extend(nodes);
        }
    }
}

/// Kind of the element being assembled
#[derive(Debug)]
enum FrameKind {
    Root,
    Paragraph,
    Heading(u8),
    BlockQuote,
    List { start: Option<u64> },
    Item,
    CodeBlock { language: Option<String> },
    HtmlBlock,
    Emphasis,
    Strong,
    Strikethrough,
    Link { url: String, title: String },
    Image { url: String },
    /// Unsupported container; its children are spliced into the parent
    Flatten,
}

impl FrameKind {
    fn from_tag(tag: Tag<'_>) -> Self {
        match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
            Tag::BlockQuote => FrameKind::BlockQuote,
            Tag::CodeBlock(kind) => FrameKind::CodeBlock {
                language: match kind {
                    CodeBlockKind::Fenced(lang) if !lang.trim().is_empty() => {
                        Some(lang.trim().to_string())
                    }
                    _ => None,
                },
            },
            Tag::HtmlBlock => FrameKind::HtmlBlock,
            Tag::List(start) => FrameKind::List { start },
            Tag::Item => FrameKind::Item,
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => FrameKind::Link {
                url: dest_url.to_string(),
                title: title.to_string(),
            },
            Tag::Image { dest_url, .. } => FrameKind::Image {
                url: dest_url.to_string(),
            },
            _ => FrameKind::Flatten,
        }
    }
}

/// An element under construction on the parser stack
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
    /// Coalesced text not yet scanned for wiki-links
    pending: String,
    checked: Option<bool>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            pending: String::new(),
            checked: None,
        }
    }

    fn push_text(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn flush(&mut self, divider: char) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        if matches!(self.kind, FrameKind::CodeBlock { .. } | FrameKind::HtmlBlock) {
            self.children.push(Node::text(text));
        } else {
            self.children.extend(wikilink::split_wikilinks(&text, divider));
        }
    }

    /// Build the finished node(s) for this frame
    fn finish(mut self, divider: char) -> Vec<Node> {
        if let FrameKind::CodeBlock { language } = self.kind {
            let code = concat_text(&self.children) + &self.pending;
            return vec![Node::CodeBlock { language, code }];
        }

        self.flush(divider);
        let children = self.children;
        let node = match self.kind {
            FrameKind::Root | FrameKind::Flatten => return children,
            FrameKind::Paragraph => Node::Paragraph { children },
            FrameKind::Heading(level) => Node::Heading { level, children },
            FrameKind::BlockQuote => Node::BlockQuote { children },
            FrameKind::List { start } => Node::List {
                ordered: start.is_some(),
                start,
                children,
            },
            FrameKind::Item => Node::ListItem {
                checked: self.checked,
                children,
            },
            FrameKind::HtmlBlock => {
                let text = concat_text(&children);
                if text.trim().is_empty() {
                    return Vec::new();
                }
                Node::paragraph(vec![Node::text(text.trim_end())])
            }
            FrameKind::Emphasis => Node::Emphasis { children },
            FrameKind::Strong => Node::Strong { children },
            FrameKind::Strikethrough => Node::Strikethrough { children },
            FrameKind::Link { url, title } => Node::Link {
                url,
                title,
                children,
            },
            FrameKind::Image { url } => Node::Image {
                url,
                alt: concat_text(&children),
            },
            FrameKind::CodeBlock { .. } => return Vec::new(),
        };
        vec![node]
    }
}

fn concat_text(nodes: &[Node]) -> String {
    nodes.iter().map(Node::plain_text).collect()
}
