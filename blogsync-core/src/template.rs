//! Body templates applied to normalized Markdown before publishing.

use crate::config::SiteConfig;
use crate::metadata::Metadata;
use minijinja::value::Rest;
use minijinja::{context, Environment};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to compile template: {0}")]
    Compile(#[source] minijinja::Error),

    #[error("Failed to execute template: {0}")]
    Render(#[source] minijinja::Error),
}

/// A compiled body template.
///
/// Templates see `body` (the normalized Markdown), `meta` (the page's
/// frontmatter) and `config` (the site configuration, including `params`).
pub struct BodyTemplate {
    env: Environment<'static>,
    source: String,
}

impl BodyTemplate {
    /// Compile a template from its source. A source starting with `@` names a
    /// file to load the template from.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let source = match source.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
                path: PathBuf::from(path),
                source,
            })?,
            None => source.to_string(),
        };

        // Surface syntax errors up front rather than once per page.
        Environment::new()
            .template_from_str(&source)
            .map_err(TemplateError::Compile)?;

        let mut env = Environment::new();
        env.add_function("join", join_path);

        Ok(Self { env, source })
    }

    /// Execute the template for one page.
    pub fn render(
        &self,
        body: &str,
        meta: &Metadata,
        config: &SiteConfig,
    ) -> Result<String, TemplateError> {
        self.env
            .render_str(
                &self.source,
                context! {
                    body => body,
                    meta => meta,
                    config => config,
                },
            )
            .map_err(TemplateError::Render)
    }
}

/// Join path segments with `/`, dropping empty segments and duplicate slashes.
fn join_path(parts: Rest<String>) -> String {
    let joined = parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    match parts.first() {
        Some(first) if first.starts_with('/') => format!("/{joined}"),
        _ => joined,
    }
}
