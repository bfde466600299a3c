//! Loading local Markdown files into publishable pages.

use crate::config::SiteConfig;
use crate::frontmatter::{self, FrontmatterError, HeaderKind};
use crate::markdown::{MarkdownError, MarkdownNormalizer};
use crate::metadata::Metadata;
use crate::slug::slug;
use crate::template::{BodyTemplate, TemplateError};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("Markdown error: {0}")]
    Markdown(#[from] MarkdownError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

/// Why a page or post was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    YamlHeader,
    Draft,
    MissingTitle,
    EmptyBody,
    NoChanges,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::YamlHeader => {
                "YAML frontmatter must be converted to TOML (run the convert command)"
            }
            SkipReason::Draft => "page is a draft",
            SkipReason::MissingTitle => "invalid or empty title",
            SkipReason::EmptyBody => "page has no body",
            SkipReason::NoChanges => "no updates needed",
        };
        f.write_str(reason)
    }
}

/// One local page, ready to be reconciled
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub path: PathBuf,
    pub metadata: Metadata,
    pub slug: String,
    /// Page's own collection, or the default one
    pub collection: String,
    pub title: String,
    /// Normalized body after the template ran
    pub body: String,
}

impl Page {
    /// Whether this page can take part in reconciliation.
    pub fn is_eligible(&self) -> bool {
        !self.title.is_empty() && !self.body.is_empty() && !self.metadata.get_bool("draft")
    }
}

/// Result of loading a page file
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Ready(Page),
    /// Not published, and its slug protects nothing
    Skipped(SkipReason),
    /// Not published, but the post at its key is left alone
    Held(Held),
}

/// A page that failed to render but still owns its remote post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Held {
    pub path: PathBuf,
    pub reason: SkipReason,
    pub slug: String,
    pub collection: String,
}

/// Turns page files into [`Page`]s: decode, normalize, template.
pub struct PageLoader {
    config: SiteConfig,
    collection: String,
    normalizer: MarkdownNormalizer,
    template: BodyTemplate,
}

impl PageLoader {
    pub fn new(config: SiteConfig, collection: impl Into<String>, template: BodyTemplate) -> Self {
        Self {
            config,
            collection: collection.into(),
            normalizer: MarkdownNormalizer::new(),
            template,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Read and prepare the page at `path`.
    pub fn load(&self, path: &Path) -> Result<Loaded, PageError> {
        tracing::debug!("opening {}", path.display());
        let content = std::fs::read_to_string(path)?;
        self.load_str(path, &content)
    }

    /// Prepare a page from already-read file contents.
    pub fn load_str(&self, path: &Path, content: &str) -> Result<Loaded, PageError> {
        let decoded = frontmatter::decode(content)?;
        // YAML headers still decode so that convert can read them, but they
        // are not published.
        if decoded.header == HeaderKind::Yaml {
            return Ok(Loaded::Skipped(SkipReason::YamlHeader));
        }

        let metadata = decoded.metadata;
        if metadata.get_bool("draft") {
            return Ok(Loaded::Skipped(SkipReason::Draft));
        }

        let slug = slug(path, &metadata);
        let collection = match metadata.get_string("collection") {
            "" => self.collection.clone(),
            col => col.to_string(),
        };
        let held = |reason| {
            Loaded::Held(Held {
                path: path.to_path_buf(),
                reason,
                slug: slug.clone(),
                collection: collection.clone(),
            })
        };

        let title = metadata.get_string("title").to_string();
        if title.is_empty() {
            return Ok(held(SkipReason::MissingTitle));
        }

        let normalized = self.normalizer.normalize(decoded.body.trim())?;
        let body = self.template.render(&normalized, &metadata, &self.config)?;
        if body.is_empty() {
            return Ok(held(SkipReason::EmptyBody));
        }

        Ok(Loaded::Ready(Page {
            path: path.to_path_buf(),
            slug,
            metadata,
            collection,
            title,
            body,
        }))
    }
}

/// Whether `path` names a Markdown page.
pub fn is_page(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("markdown")
    )
}

/// All page files under `root`, in file-name order.
pub fn walk_pages(root: &Path) -> Vec<PathBuf> {
    let mut pages = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_page(entry.path()) => {
                pages.push(entry.into_path());
            }
            Ok(_) => {}
            Err(err) => tracing::warn!("error walking {}: {}", root.display(), err),
        }
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn loader() -> PageLoader {
        let template = BodyTemplate::compile("{{ body }}").unwrap();
        PageLoader::new(SiteConfig::default(), "blog", template)
    }

    fn load(content: &str) -> Loaded {
        loader()
            .load_str(Path::new("content/post.md"), content)
            .unwrap()
    }

    #[test]
    fn test_ready_page() {
        let loaded = load("+++\ntitle = \"Hi\"\ndate = \"2020-01-01\"\n+++\nhello\nworld\n");
        let Loaded::Ready(page) = loaded else {
            panic!("expected a ready page, got {loaded:?}");
        };
        assert_eq!(page.slug, "hi");
        assert_eq!(page.body, "hello world\n");
        assert_eq!(page.collection, "blog");
        assert_eq!(page.title, "Hi");
        assert!(page.is_eligible());
    }

    #[test]
    fn test_collection_override() {
        let loaded = load("+++\ntitle = \"Hi\"\ncollection = \"notes\"\n+++\nbody\n");
        match loaded {
            Loaded::Ready(page) => assert_eq!(page.collection, "notes"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_skip_reasons() {
        assert_eq!(
            load("---\ntitle: Hi\n---\nbody\n"),
            Loaded::Skipped(SkipReason::YamlHeader)
        );
        assert_eq!(
            load("+++\ntitle = \"Hi\"\ndraft = true\n+++\nbody\n"),
            Loaded::Skipped(SkipReason::Draft)
        );
    }

    #[test]
    fn test_unrenderable_pages_keep_their_key() {
        assert_eq!(
            load("+++\nslug = \"kept\"\ndraft = \"false\"\n+++\nbody\n"),
            Loaded::Held(Held {
                path: PathBuf::from("content/post.md"),
                reason: SkipReason::MissingTitle,
                slug: "kept".into(),
                collection: "blog".into(),
            })
        );
        assert_eq!(
            load("+++\ntitle = \"Hi\"\ncollection = \"notes\"\n+++\n\n   \n"),
            Loaded::Held(Held {
                path: PathBuf::from("content/post.md"),
                reason: SkipReason::EmptyBody,
                slug: "hi".into(),
                collection: "notes".into(),
            })
        );
    }

    #[test]
    fn test_template_emptying_body_skips() {
        let template = BodyTemplate::compile("{% if meta.keep %}{{ body }}{% endif %}").unwrap();
        let loader = PageLoader::new(SiteConfig::default(), "", template);
        let loaded = loader
            .load_str(Path::new("a.md"), "+++\ntitle = \"T\"\n+++\ntext\n")
            .unwrap();
        assert!(matches!(
            loaded,
            Loaded::Held(Held {
                reason: SkipReason::EmptyBody,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_error_is_an_error() {
        let result = loader().load_str(Path::new("a.md"), "no header here\n");
        assert!(matches!(result, Err(PageError::Frontmatter(_))));
    }

    #[test]
    fn test_walk_pages_filters_and_sorts() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("posts");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.markdown"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(nested.join("c.md"), "").unwrap();

        let pages = walk_pages(dir.path());
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.markdown"),
                PathBuf::from("b.md"),
                PathBuf::from("posts/c.md"),
            ]
        );
    }

    #[test]
    fn test_walk_missing_root_is_empty() {
        assert!(walk_pages(Path::new("/nonexistent/blogsync/content")).is_empty());
    }
}
