//! Frontmatter decoding and encoding.
//!
//! Pages start with a header marker line, `+++` for TOML or `---` for YAML,
//! followed by the metadata and the same marker line again.

use crate::metadata::Metadata;
use thiserror::Error;

pub const TOML_MARKER: &str = "+++";
pub const YAML_MARKER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Missing frontmatter header (expected {TOML_MARKER} or {YAML_MARKER})")]
    MissingHeader,

    #[error("Unterminated frontmatter: no closing {0} line")]
    Unterminated(&'static str),

    #[error("Invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to encode TOML: {0}")]
    EncodeError(#[from] toml::ser::Error),
}

/// Kind of header a page was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Toml,
    Yaml,
}

impl HeaderKind {
    pub fn marker(self) -> &'static str {
        match self {
            HeaderKind::Toml => TOML_MARKER,
            HeaderKind::Yaml => YAML_MARKER,
        }
    }

    fn from_line(line: &str) -> Option<Self> {
        match line {
            TOML_MARKER => Some(HeaderKind::Toml),
            YAML_MARKER => Some(HeaderKind::Yaml),
            _ => None,
        }
    }
}

/// A decoded page: header kind, metadata and everything after the header
#[derive(Debug, Clone)]
pub struct Decoded<'a> {
    pub header: HeaderKind,
    pub metadata: Metadata,
    pub body: &'a str,
}

/// Decode the frontmatter at the start of `content`.
///
/// # Example
///
/// ```
/// use blogsync_core::frontmatter::{decode, HeaderKind};
///
/// let content = "+++\ntitle = \"My Post\"\n+++\nHello\n";
/// let decoded = decode(content).unwrap();
/// assert_eq!(decoded.header, HeaderKind::Toml);
/// assert_eq!(decoded.metadata.get_string("title"), "My Post");
/// assert_eq!(decoded.body, "Hello\n");
/// ```
pub fn decode(content: &str) -> Result<Decoded<'_>, FrontmatterError> {
    let mut lines = LineOffsets::new(content);

    let header = lines
        .next()
        .and_then(|(_, line)| HeaderKind::from_line(line))
        .ok_or(FrontmatterError::MissingHeader)?;

    let start = lines.pos;
    let mut end = None;
    for (line_start, line) in lines.by_ref() {
        if line == header.marker() {
            end = Some(line_start);
            break;
        }
    }
    let end = end.ok_or(FrontmatterError::Unterminated(header.marker()))?;
    let raw = &content[start..end];
    let body = &content[lines.pos..];

    let metadata = match header {
        HeaderKind::Toml => Metadata::from(toml::from_str::<toml::Table>(raw)?),
        HeaderKind::Yaml => {
            if raw.trim().is_empty() {
                Metadata::new()
            } else {
                Metadata::from_yaml(serde_yaml::from_str(raw)?)
            }
        }
    };

    Ok(Decoded {
        header,
        metadata,
        body,
    })
}

/// Encode metadata as a complete `+++`-delimited TOML header.
pub fn encode_toml(metadata: &Metadata) -> Result<String, FrontmatterError> {
    let table = toml::to_string(&metadata.to_toml())?;
    Ok(format!("{TOML_MARKER}\n{table}{TOML_MARKER}\n"))
}

/// Iterator over lines with their byte offsets, tolerating `\r\n`.
struct LineOffsets<'a> {
    content: &'a str,
    pos: usize,
}

impl<'a> LineOffsets<'a> {
    fn new(content: &'a str) -> Self {
        Self { content, pos: 0 }
    }
}

impl<'a> Iterator for LineOffsets<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.content.len() {
            return None;
        }
        let start = self.pos;
        let rest = &self.content[start..];
        let (line, advance) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        Some((start, line.strip_suffix('\r').unwrap_or(line)))
    }
}
