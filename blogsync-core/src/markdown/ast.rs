//! Document tree built from the pulldown-cmark event stream.
//!
//! pulldown-cmark only exposes a flat stream of start/end events. The
//! normalizer needs sibling relationships (is the previous block a
//! paragraph?) so the stream is folded into an owned tree first.

use super::MarkdownError;
use pulldown_cmark::{CodeBlockKind, Event, Tag};

/// Closed set of node kinds the normalizer understands
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    List,
    ListItem,
    Paragraph,
    Heading { level: u8 },
    HorizontalRule,
    Emphasis,
    Strong,
    Strikethrough,
    Link { destination: String, title: String },
    Image { destination: String, title: String },
    BlockQuote,
    Text(String),
    HtmlBlock(String),
    CodeBlock { info: String, literal: String },
    InlineCode(String),
    HardBreak,
    InlineHtml(String),
    /// Anything else the parser produces (tables, footnotes, math, ...)
    Other(&'static str),
}

impl NodeKind {
    /// Whether this node lives inside a paragraph rather than at block level.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            NodeKind::Text(_)
                | NodeKind::Emphasis
                | NodeKind::Strong
                | NodeKind::Strikethrough
                | NodeKind::Link { .. }
                | NodeKind::Image { .. }
                | NodeKind::InlineCode(_)
                | NodeKind::HardBreak
                | NodeKind::InlineHtml(_)
                | NodeKind::Other("TaskListMarker")
                | NodeKind::Other("FootnoteReference")
                | NodeKind::Other("InlineMath")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    fn push(&mut self, child: Node) {
        // Adjacent text runs (split by the parser at soft breaks and entity
        // boundaries) are kept as a single text node.
        if let NodeKind::Text(next) = &child.kind {
            if let Some(Node {
                kind: NodeKind::Text(prev),
                ..
            }) = self.children.last_mut()
            {
                prev.push_str(next);
                return;
            }
        }
        self.children.push(child);
    }
}

/// Fold a pulldown-cmark event stream into a [`Node`] tree rooted at a
/// `Document` node.
pub fn build_tree<'a, I>(events: I) -> Result<Node, MarkdownError>
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut stack = vec![Node::new(NodeKind::Document)];

    for event in events {
        match event {
            Event::Start(tag) => stack.push(Node::new(tag_kind(tag))),
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(MarkdownError::UnbalancedEnd);
                }
                let mut node = stack.pop().ok_or(MarkdownError::UnbalancedEnd)?;
                finish(&mut node);
                if let Some(parent) = stack.last_mut() {
                    parent.push(node);
                }
            }
            Event::Text(text) => {
                let top = stack.last_mut().ok_or(MarkdownError::UnbalancedEnd)?;
                match &mut top.kind {
                    NodeKind::CodeBlock { literal, .. } => literal.push_str(&text),
                    NodeKind::HtmlBlock(literal) => literal.push_str(&text),
                    _ => top.push(Node::new(NodeKind::Text(text.to_string()))),
                }
            }
            Event::Html(html) => {
                let top = stack.last_mut().ok_or(MarkdownError::UnbalancedEnd)?;
                match &mut top.kind {
                    NodeKind::HtmlBlock(literal) => literal.push_str(&html),
                    _ => top.push(Node::new(NodeKind::HtmlBlock(html.to_string()))),
                }
            }
            other => {
                let leaf = leaf_kind(other);
                let top = stack.last_mut().ok_or(MarkdownError::UnbalancedEnd)?;
                top.push(Node::new(leaf));
            }
        }
    }

    match stack.len() {
        1 => stack.pop().ok_or(MarkdownError::UnbalancedEnd),
        n => Err(MarkdownError::Unclosed(n - 1)),
    }
}

fn finish(node: &mut Node) {
    match &mut node.kind {
        NodeKind::HtmlBlock(literal) => {
            let trimmed = literal.trim_end_matches('\n').len();
            literal.truncate(trimmed);
        }
        // Tight list items hold their text directly; give them the implicit
        // paragraph a loose item would have.
        NodeKind::ListItem => wrap_inline_runs(&mut node.children),
        _ => {}
    }
}

fn wrap_inline_runs(children: &mut Vec<Node>) {
    if !children.iter().any(|c| c.kind.is_inline()) {
        return;
    }

    let mut wrapped = Vec::with_capacity(children.len());
    let mut run: Vec<Node> = Vec::new();
    for child in children.drain(..) {
        if child.kind.is_inline() {
            run.push(child);
            continue;
        }
        if !run.is_empty() {
            wrapped.push(Node::with_children(
                NodeKind::Paragraph,
                std::mem::take(&mut run),
            ));
        }
        wrapped.push(child);
    }
    if !run.is_empty() {
        wrapped.push(Node::with_children(NodeKind::Paragraph, run));
    }
    *children = wrapped;
}

fn tag_kind(tag: Tag<'_>) -> NodeKind {
    match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Heading { level: level as u8 },
        Tag::BlockQuote(_) => NodeKind::BlockQuote,
        Tag::CodeBlock(kind) => NodeKind::CodeBlock {
            info: match kind {
                CodeBlockKind::Fenced(info) => info.to_string(),
                CodeBlockKind::Indented => String::new(),
            },
            literal: String::new(),
        },
        Tag::HtmlBlock => NodeKind::HtmlBlock(String::new()),
        Tag::List(_) => NodeKind::List,
        Tag::Item => NodeKind::ListItem,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strong => NodeKind::Strong,
        Tag::Strikethrough => NodeKind::Strikethrough,
        Tag::Link {
            dest_url, title, ..
        } => NodeKind::Link {
            destination: dest_url.to_string(),
            title: title.to_string(),
        },
        Tag::Image {
            dest_url, title, ..
        } => NodeKind::Image {
            destination: dest_url.to_string(),
            title: title.to_string(),
        },
        Tag::FootnoteDefinition(_) => NodeKind::Other("FootnoteDefinition"),
        Tag::Table(_) => NodeKind::Other("Table"),
        Tag::TableHead => NodeKind::Other("TableHead"),
        Tag::TableRow => NodeKind::Other("TableRow"),
        Tag::TableCell => NodeKind::Other("TableCell"),
        Tag::MetadataBlock(_) => NodeKind::Other("MetadataBlock"),
        _ => NodeKind::Other("Unknown"),
    }
}

fn leaf_kind(event: Event<'_>) -> NodeKind {
    match event {
        Event::Code(code) => NodeKind::InlineCode(code.to_string()),
        Event::InlineHtml(html) => NodeKind::InlineHtml(html.to_string()),
        // Soft breaks are the hard wrapping the normalizer removes; keep them
        // as newlines inside the surrounding text run.
        Event::SoftBreak => NodeKind::Text("\n".to_string()),
        Event::HardBreak => NodeKind::HardBreak,
        Event::Rule => NodeKind::HorizontalRule,
        Event::FootnoteReference(_) => NodeKind::Other("FootnoteReference"),
        Event::TaskListMarker(_) => NodeKind::Other("TaskListMarker"),
        Event::InlineMath(_) => NodeKind::Other("InlineMath"),
        Event::DisplayMath(_) => NodeKind::Other("DisplayMath"),
        _ => NodeKind::Other("Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{Options, Parser, TagEnd};

    fn tree(markdown: &str) -> Node {
        build_tree(Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH)).unwrap()
    }

    #[test]
    fn test_soft_breaks_merge_into_one_text_node() {
        let doc = tree("hello\nworld");
        assert_eq!(
            doc,
            Node::with_children(
                NodeKind::Document,
                vec![Node::with_children(
                    NodeKind::Paragraph,
                    vec![Node::new(NodeKind::Text("hello\nworld".into()))]
                )]
            )
        );
    }

    #[test]
    fn test_tight_items_get_paragraphs() {
        let doc = tree("* a\n* b\n");
        let list = &doc.children[0];
        assert_eq!(list.kind, NodeKind::List);
        for item in &list.children {
            assert_eq!(item.kind, NodeKind::ListItem);
            assert_eq!(item.children[0].kind, NodeKind::Paragraph);
        }
    }

    #[test]
    fn test_nested_list_item_keeps_sublist_as_block() {
        let doc = tree("* a\n  * b\n");
        let item = &doc.children[0].children[0];
        let kinds: Vec<_> = item.children.iter().map(|c| c.kind.clone()).collect();
        assert_eq!(kinds, vec![NodeKind::Paragraph, NodeKind::List]);
    }

    #[test]
    fn test_code_block_keeps_literal_newlines() {
        let doc = tree("```rust\nfn main() {}\nlet x;\n```\n");
        assert_eq!(
            doc.children[0].kind,
            NodeKind::CodeBlock {
                info: "rust".into(),
                literal: "fn main() {}\nlet x;\n".into()
            }
        );
    }

    #[test]
    fn test_html_block_literal_is_trimmed() {
        let doc = tree("<div>\nhi\n</div>\n");
        assert_eq!(
            doc.children[0].kind,
            NodeKind::HtmlBlock("<div>\nhi\n</div>".into())
        );
    }

    #[test]
    fn test_unbalanced_end_is_an_error() {
        let events = vec![Event::End(TagEnd::Paragraph)];
        assert!(matches!(build_tree(events), Err(MarkdownError::UnbalancedEnd)));
    }

    #[test]
    fn test_unclosed_start_is_an_error() {
        let events = vec![Event::Start(Tag::Paragraph), Event::Start(Tag::Emphasis)];
        assert!(matches!(build_tree(events), Err(MarkdownError::Unclosed(2))));
    }
}
