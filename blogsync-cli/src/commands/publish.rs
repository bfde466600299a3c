//! Publish pages to write.as.

use super::RemoteArgs;
use anyhow::{Context, Result};
use blogsync_core::{BodyTemplate, PageLoader, PublishOptions, Publisher, SiteConfig};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    /// Delete posts that have no matching page
    #[arg(long)]
    pub delete: bool,

    /// Perform a trial run with no changes made
    #[arg(long)]
    pub dry_run: bool,

    /// Update posts even if nothing has changed
    #[arg(short, long)]
    pub force: bool,

    /// Create collections that do not exist yet
    #[arg(long)]
    pub create_collections: bool,

    /// Default collection alias, overrides the config file
    #[arg(long)]
    pub collection: Option<String>,

    /// Directory containing pages, overrides the config file
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Body template, or @file to read one
    #[arg(long, long_help = TMPL_HELP)]
    pub tmpl: Option<String>,
}

const TMPL_HELP: &str = "\
Body template applied to every page before it is published, or @file to read
one from a file. Templates use minijinja (Jinja2) syntax.

Templates are passed the following data (represented in TOML format):

    body = \"\"

    [meta]

    [config]
    title = \"\"
    description = \"\"
    languageCode = \"\"
    collection = \"\"

    [config.params]

The body field contains the normalized Markdown of the page being published,
that is, everything after the frontmatter. The meta table contains the fields
from the page's frontmatter. The config table contains values loaded from the
site config file. Arbitrary values added to the config file must be in its
params table.

If no template is given the body is published as-is using the template:

    {{ body }}";

impl PublishArgs {
    pub fn options(&self, config: &SiteConfig) -> PublishOptions {
        let mut opts = PublishOptions::from_config(config);
        opts.delete = self.delete;
        opts.dry_run = self.dry_run;
        opts.force = self.force;
        opts.create_collections = self.create_collections;
        if let Some(collection) = &self.collection {
            opts.collection = collection.clone();
        }
        if let Some(content) = &self.content {
            opts.content = content.clone();
        }
        if let Some(tmpl) = &self.tmpl {
            opts.tmpl = tmpl.clone();
        }
        opts
    }
}

/// Load configuration and build the page loader for a run.
pub(crate) fn prepare(config_path: &Path, args: &PublishArgs) -> Result<(PublishOptions, PageLoader)> {
    let config = SiteConfig::load_or_default(config_path).context("Failed to load configuration")?;
    let opts = args.options(&config);
    let template = BodyTemplate::compile(&opts.tmpl).context("Failed to compile template")?;
    let loader = PageLoader::new(config, opts.collection.clone(), template);
    Ok((opts, loader))
}

pub async fn publish(config_path: &Path, remote: &RemoteArgs, args: &PublishArgs) -> Result<()> {
    let (opts, loader) = prepare(config_path, args)?;
    if opts.dry_run {
        tracing::info!("dry run, no changes will be made");
    }

    let client = remote.client()?;
    let mut publisher = Publisher::new(client, opts, loader.config());
    let report = publisher.run(&loader).await?;

    tracing::info!("publish complete: {}", report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PublishArgs {
        PublishArgs {
            delete: false,
            dry_run: false,
            force: false,
            create_collections: false,
            collection: None,
            content: None,
            tmpl: None,
        }
    }

    #[test]
    fn options_default_to_config() {
        let config = SiteConfig {
            collection: "blog".into(),
            tmpl: Some("{{ body }}!".into()),
            ..SiteConfig::default()
        };
        let opts = args().options(&config);
        assert_eq!(opts.collection, "blog");
        assert_eq!(opts.tmpl, "{{ body }}!");
        assert_eq!(opts.content, PathBuf::from("content/"));
    }

    #[test]
    fn flags_override_config() {
        let config = SiteConfig {
            collection: "blog".into(),
            ..SiteConfig::default()
        };
        let opts = PublishArgs {
            delete: true,
            dry_run: true,
            collection: Some("notes".into()),
            content: Some("posts".into()),
            ..args()
        }
        .options(&config);
        assert!(opts.delete && opts.dry_run);
        assert_eq!(opts.collection, "notes");
        assert_eq!(opts.content, PathBuf::from("posts"));
    }
}
