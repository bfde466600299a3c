//! Rewriting pages into the canonical form publishing expects.
//!
//! Conversion turns YAML headers into TOML, string `date` and `lastmod`
//! values into TOML datetimes, and trims the body to a single leading and
//! trailing newline. Files are rewritten in place and metadata key order is
//! not preserved, so pages that need no change are left untouched.

use crate::frontmatter::{self, FrontmatterError, HeaderKind};
use crate::metadata::{parse_time, Value, DEFAULT_TIME_FORMATS};
use crate::page::walk_pages;
use std::fmt;
use std::path::Path;
use thiserror::Error;

const DATE_KEYS: [&str; 2] = ["date", "lastmod"];

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    TomlHeader,
    Date(&'static str),
    TrimmedBody,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::TomlHeader => f.write_str("converting non-TOML frontmatter"),
            Change::Date(key) => write!(f, "converting string {key}"),
            Change::TrimmedBody => f.write_str("trimming body"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub content: String,
    pub changes: Vec<Change>,
}

/// Convert one page's source. Returns `None` when it is already canonical.
pub fn convert_page(source: &str) -> Result<Option<Converted>, FrontmatterError> {
    let decoded = frontmatter::decode(source)?;
    let mut metadata = decoded.metadata;
    let mut changes = Vec::new();

    if decoded.header != HeaderKind::Toml {
        changes.push(Change::TomlHeader);
    }

    for key in DATE_KEYS {
        let Some(Value::String(raw)) = metadata.get(key) else {
            continue;
        };
        match parse_time(raw, DEFAULT_TIME_FORMATS) {
            Some(time) => {
                metadata.insert(key, time);
                changes.push(Change::Date(key));
            }
            None => tracing::warn!("cannot parse {} {:?}, leaving it as a string", key, raw),
        }
    }

    let trimmed = decoded.body.trim();
    let body = if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}\n")
    };
    if body != decoded.body {
        changes.push(Change::TrimmedBody);
    }

    if changes.is_empty() {
        return Ok(None);
    }

    let mut content = frontmatter::encode_toml(&metadata)?;
    content.push_str(&body);
    Ok(Some(Converted { content, changes }))
}

/// Outcome of converting a content directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertReport {
    pub converted: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Convert every page under `root`. With `dry_run` set, report what would
/// change without writing.
pub fn convert_dir(root: &Path, dry_run: bool) -> ConvertReport {
    let mut report = ConvertReport::default();
    for path in walk_pages(root) {
        match convert_file(&path, dry_run) {
            Ok(true) => report.converted += 1,
            Ok(false) => report.unchanged += 1,
            Err(err) => {
                tracing::warn!("error converting {}, skipping: {}", path.display(), err);
                report.failed += 1;
            }
        }
    }
    report
}

fn convert_file(path: &Path, dry_run: bool) -> Result<bool, ConvertError> {
    let source = std::fs::read_to_string(path)?;
    let Some(converted) = convert_page(&source)? else {
        return Ok(false);
    };
    for change in &converted.changes {
        tracing::info!("{} in {}…", change, path.display());
    }
    if !dry_run {
        std::fs::write(path, converted.content)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_canonical_page_is_unchanged() {
        let source = "+++\ntitle = \"Hi\"\n+++\n\nhello\n";
        assert_eq!(convert_page(source).unwrap(), None);
    }

    #[test]
    fn test_yaml_becomes_toml() {
        let source = "---\ntitle: Hi\ndate: 2020-01-02\n---\nhello\n";
        let converted = convert_page(source).unwrap().unwrap();
        assert_eq!(
            converted.changes,
            vec![Change::TomlHeader, Change::Date("date"), Change::TrimmedBody]
        );

        let decoded = frontmatter::decode(&converted.content).unwrap();
        assert_eq!(decoded.header, HeaderKind::Toml);
        assert_eq!(decoded.metadata.get_string("title"), "Hi");
        assert!(matches!(decoded.metadata.get("date"), Some(Value::Time(_))));
        assert_eq!(decoded.body, "\nhello\n");
    }

    #[test]
    fn test_string_dates_become_datetimes() {
        let source = "+++\ntitle = \"Hi\"\nlastmod = \"2021-03-04T05:06:07Z\"\n+++\n\nbody\n";
        let converted = convert_page(source).unwrap().unwrap();
        assert_eq!(converted.changes, vec![Change::Date("lastmod")]);
        assert!(converted.content.contains("lastmod = 2021-03-04T05:06:07"));
        assert!(!converted.content.contains("lastmod = \""));
    }

    #[test]
    fn test_unparseable_date_is_kept() {
        let source = "+++\ndate = \"someday\"\n+++\n\nbody\n";
        assert_eq!(convert_page(source).unwrap(), None);
    }

    #[test]
    fn test_body_is_trimmed() {
        let source = "+++\ntitle = \"Hi\"\n+++\n\n\n  body\n\n\n";
        let converted = convert_page(source).unwrap().unwrap();
        assert_eq!(converted.changes, vec![Change::TrimmedBody]);
        assert!(converted.content.ends_with("+++\n\nbody\n"));
    }

    #[test]
    fn test_empty_body_writes_header_only() {
        let source = "+++\ntitle = \"Hi\"\n+++\n\n\n";
        let converted = convert_page(source).unwrap().unwrap();
        assert_eq!(converted.content, "+++\ntitle = \"Hi\"\n+++\n");
    }

    #[test]
    fn test_missing_header_is_an_error() {
        assert!(convert_page("just text\n").is_err());
    }

    #[test]
    fn test_convert_dir() {
        let dir = tempdir().unwrap();
        let yaml = dir.path().join("a.md");
        let canonical = dir.path().join("b.md");
        let broken = dir.path().join("c.md");
        fs::write(&yaml, "---\ntitle: A\n---\nbody\n").unwrap();
        fs::write(&canonical, "+++\ntitle = \"B\"\n+++\n\nbody\n").unwrap();
        fs::write(&broken, "no header\n").unwrap();

        let report = convert_dir(dir.path(), true);
        assert_eq!(
            report,
            ConvertReport {
                converted: 1,
                unchanged: 1,
                failed: 1,
            }
        );
        assert!(fs::read_to_string(&yaml).unwrap().starts_with("---"));

        convert_dir(dir.path(), false);
        assert_eq!(
            fs::read_to_string(&yaml).unwrap(),
            "+++\ntitle = \"A\"\n+++\n\nbody\n"
        );
        assert_eq!(
            fs::read_to_string(&canonical).unwrap(),
            "+++\ntitle = \"B\"\n+++\n\nbody\n"
        );
    }
}
