//! Markdown normalization: parse, then re-emit Markdown without hard wrapping.

pub mod ast;
pub mod unwrap;

use pulldown_cmark::{Options, Parser};
use thiserror::Error;

pub use ast::{build_tree, Node, NodeKind};
pub use unwrap::UnwrapRenderer;

#[derive(Error, Debug)]
pub enum MarkdownError {
    #[error("End event without a matching start")]
    UnbalancedEnd,

    #[error("{0} node(s) left open at end of input")]
    Unclosed(usize),
}

/// Markdown normalizer with the parser extensions publishing relies on
pub struct MarkdownNormalizer {
    options: Options,
}

impl MarkdownNormalizer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options }
    }

    /// Parse `markdown` into a document tree.
    pub fn parse(&self, markdown: &str) -> Result<Node, MarkdownError> {
        build_tree(Parser::new_ext(markdown, self.options))
    }

    /// Normalize `markdown`, removing hard wrapping from prose.
    pub fn normalize(&self, markdown: &str) -> Result<String, MarkdownError> {
        let document = self.parse(markdown)?;
        Ok(UnwrapRenderer::new().render(&document))
    }
}

impl Default for MarkdownNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
