//! Site configuration and publish options.

use crate::metadata::DEFAULT_TIME_FORMATS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Template applied to every page when none is configured
pub const DEFAULT_TEMPLATE: &str = "{{ body }}";

/// Content directory used when none is configured
pub const DEFAULT_CONTENT_DIR: &str = "content/";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Site configuration matching the `config.toml` schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Default post language
    #[serde(default, rename = "languageCode")]
    pub language: String,

    /// Default collection alias for pages that do not name one
    #[serde(default)]
    pub collection: String,

    /// Directory containing pages
    #[serde(default)]
    pub content: Option<PathBuf>,

    /// Body template, or `@path` to load one from a file
    #[serde(default)]
    pub tmpl: Option<String>,

    /// Free-form values exposed to templates
    #[serde(default)]
    pub params: BTreeMap<String, toml::Value>,

    /// File this configuration was read from; relative paths resolve
    /// against its directory
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl SiteConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: SiteConfig = toml::from_str(&contents)?;

        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load configuration if the file exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("no config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Content directory, resolved relative to the config file
    pub fn content_dir(&self) -> PathBuf {
        let content = self
            .content
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));
        self.resolve_path(&content)
    }

    /// Configured body template source
    pub fn template(&self) -> &str {
        self.tmpl.as_deref().unwrap_or(DEFAULT_TEMPLATE)
    }

    /// Resolve a path relative to the config file location
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.config_path.as_deref().and_then(Path::parent) {
            Some(parent) => parent.join(path),
            None => path.to_path_buf(),
        }
    }
}

/// Options controlling a publish run
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Delete remote posts with no matching page
    pub delete: bool,
    /// Classify and log without issuing writes
    pub dry_run: bool,
    /// Update posts even when nothing changed
    pub force: bool,
    /// Create missing collections before writing into them
    pub create_collections: bool,
    /// Collection for pages that do not set one
    pub collection: String,
    pub content: PathBuf,
    pub tmpl: String,
    /// Layouts accepted for string timestamps, tried after RFC 3339
    pub time_formats: Vec<String>,
}

impl PublishOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            delete: false,
            dry_run: false,
            force: false,
            create_collections: false,
            collection: config.collection.clone(),
            content: config.content_dir(),
            tmpl: config.template().to_string(),
            time_formats: DEFAULT_TIME_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}
