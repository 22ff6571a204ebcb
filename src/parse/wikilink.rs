//! Wiki-link tokens: `[[Title]]` and `[[Title|Alias]]`
//!
//! pulldown-cmark has no notion of wiki-links, so they are recognized in the
//! coalesced text of each inline run.

use crate::document::Node;

/// Split a run of plain text into text and reference nodes
///
/// Malformed tokens (unclosed `[[`, empty title) stay in the surrounding text.
/// With nested openers the innermost `[[` before the first `]]` starts the
/// token.
pub(crate) fn split_wikilinks(text: &str, divider: char) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(open) = rest.find("[[") {
        let Some(close_rel) = rest[open + 2..].find("]]") else {
            break;
        };
        let close = open + 2 + close_rel;
        // rfind always succeeds: `open` itself is a candidate
        let start = rest[..close].rfind("[[").unwrap_or(open);
        let token_end = close + 2;

        match parse_token(&rest[start + 2..close], divider) {
            Some(reference) => {
                plain.push_str(&rest[..start]);
                flush_text(&mut plain, &mut nodes);
                nodes.push(reference);
            }
            None => plain.push_str(&rest[..token_end]),
        }
        rest = &rest[token_end..];
    }

    plain.push_str(rest);
    flush_text(&mut plain, &mut nodes);
    nodes
}

/// Parse the inside of a `[[...]]` token
fn parse_token(inner: &str, divider: char) -> Option<Node> {
    let (title, alias) = match inner.split_once(divider) {
        Some((title, alias)) => (title.trim(), Some(alias.trim())),
        None => (inner.trim(), None),
    };
    if title.is_empty() {
        return None;
    }
    let alias = alias.filter(|a| !a.is_empty()).map(str::to_string);
    Some(Node::reference(title, alias))
}

fn flush_text(plain: &mut String, nodes: &mut Vec<Node>) {
    if !plain.is_empty() {
        nodes.push(Node::text(std::mem::take(plain)));
    }
}
