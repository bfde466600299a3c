//! Convert page metadata to the canonical format.

use anyhow::{Context, Result};
use blogsync_core::{convert_dir, SiteConfig};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Report what would change without rewriting files
    #[arg(long)]
    pub dry_run: bool,

    /// Directory containing pages, overrides the config file
    #[arg(long)]
    pub content: Option<PathBuf>,
}

pub fn convert(config_path: &Path, args: &ConvertArgs) -> Result<()> {
    let config = SiteConfig::load_or_default(config_path).context("Failed to load configuration")?;
    let content = args.content.clone().unwrap_or_else(|| config.content_dir());

    let report = convert_dir(&content, args.dry_run);
    tracing::info!(
        "{} converted, {} unchanged, {} failed",
        report.converted,
        report.unchanged,
        report.failed
    );
    Ok(())
}
