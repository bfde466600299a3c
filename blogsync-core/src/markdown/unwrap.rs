//! Renderer that writes Markdown back out with hard wrapping removed.
//!
//! The target renderer treats every newline inside prose as a line break, so
//! text runs are joined with spaces while lists, quotes, emphasis, links,
//! images, code and raw HTML keep their meaning.

use super::ast::{Node, NodeKind};
use std::fmt::{self, Write};

/// Depth-first enter/exit renderer. Only nesting counters are carried between
/// nodes; [`UnwrapRenderer::render`] starts from a clean state every call.
#[derive(Debug, Default)]
pub struct UnwrapRenderer {
    list_depth: usize,
    quote_depth: usize,
}

impl UnwrapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a document tree to a string.
    pub fn render(&mut self, document: &Node) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.render_to(document, &mut out);
        out
    }

    /// Render a document tree into any [`fmt::Write`] sink.
    pub fn render_to<W: Write>(&mut self, document: &Node, w: &mut W) -> fmt::Result {
        self.list_depth = 0;
        self.quote_depth = 0;
        self.walk(document, None, w)
    }

    fn walk<W: Write>(&mut self, node: &Node, prev: Option<&Node>, w: &mut W) -> fmt::Result {
        self.enter(node, prev, w)?;
        let mut prev_child = None;
        for child in &node.children {
            self.walk(child, prev_child, w)?;
            prev_child = Some(child);
        }
        self.exit(node, w)
    }

    fn enter<W: Write>(&mut self, node: &Node, prev: Option<&Node>, w: &mut W) -> fmt::Result {
        match &node.kind {
            NodeKind::Document => Ok(()),
            NodeKind::List => {
                self.list_depth += 1;
                Ok(())
            }
            NodeKind::ListItem => {
                for _ in 0..self.list_depth {
                    w.write_str("  ")?;
                }
                w.write_str("* ")
            }
            NodeKind::Paragraph => {
                // Adjacent paragraphs need a blank line between them or they
                // would re-parse as one block.
                if matches!(prev, Some(p) if p.kind == NodeKind::Paragraph) {
                    w.write_char('\n')?;
                }
                if self.quote_depth > 0 {
                    w.write_str("> ")?;
                }
                Ok(())
            }
            NodeKind::Heading { level } => {
                // The tree does not keep the original marker style, so every
                // heading comes out in ATX form.
                for _ in 0..*level {
                    w.write_char('#')?;
                }
                w.write_char(' ')
            }
            NodeKind::HorizontalRule => Ok(()),
            NodeKind::Emphasis => w.write_str("*"),
            NodeKind::Strong => w.write_str("**"),
            NodeKind::Strikethrough => w.write_str("~~"),
            NodeKind::Link { .. } => w.write_str("["),
            NodeKind::Image { .. } => w.write_str("!["),
            NodeKind::BlockQuote => {
                // The "> " marker is written by each paragraph; an empty quote
                // writes nothing.
                self.quote_depth += 1;
                Ok(())
            }
            NodeKind::Text(literal) => w.write_str(&literal.replace('\n', " ")),
            NodeKind::HardBreak => w.write_char('\n'),
            // Two newlines so whatever follows starts a new block.
            NodeKind::HtmlBlock(literal) => write!(w, "{literal}\n\n"),
            NodeKind::InlineHtml(literal) => w.write_str(literal),
            NodeKind::InlineCode(code) => write!(w, "`{code}`"),
            NodeKind::CodeBlock { info, literal } => write!(w, "```{info}\n{literal}```\n"),
            NodeKind::Other(name) => {
                tracing::warn!("unsupported markdown node {} found", name);
                Ok(())
            }
        }
    }

    fn exit<W: Write>(&mut self, node: &Node, w: &mut W) -> fmt::Result {
        match &node.kind {
            NodeKind::List => {
                self.list_depth = self.list_depth.saturating_sub(1);
                Ok(())
            }
            NodeKind::Paragraph | NodeKind::Heading { .. } => w.write_char('\n'),
            NodeKind::HorizontalRule => w.write_str("---\n"),
            NodeKind::Emphasis => w.write_str("*"),
            NodeKind::Strong => w.write_str("**"),
            NodeKind::Strikethrough => w.write_str("~~"),
            NodeKind::Link { destination, title } | NodeKind::Image { destination, title } => {
                write!(w, "]({destination} {title:?})")
            }
            NodeKind::BlockQuote => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                w.write_char('\n')
            }
            _ => Ok(()),
        }
    }
}
