//! Slug derivation for pages.

use crate::metadata::Metadata;
use std::path::Path;

/// Derive the canonical slug for the page at `path`.
///
/// Priority:
/// - the `slug` frontmatter key
/// - the `title` frontmatter key
/// - the file name without extension, or the parent directory's name for
///   `index.*` files
///
/// The chosen value is lowercased, with spaces and path separators replaced by
/// hyphens. Uniqueness is not enforced.
///
/// # Examples
///
/// ```
/// use blogsync_core::metadata::Metadata;
/// use blogsync_core::slug::slug;
/// use std::path::Path;
///
/// let mut meta = Metadata::new();
/// assert_eq!(slug(Path::new("content/posts/First Post.md"), &meta), "first-post");
/// assert_eq!(slug(Path::new("content/about/index.md"), &meta), "about");
///
/// meta.insert("title", "Hello World");
/// assert_eq!(slug(Path::new("content/x.md"), &meta), "hello-world");
/// ```
pub fn slug(path: &Path, metadata: &Metadata) -> String {
    let explicit = metadata.get_string("slug");
    if !explicit.is_empty() {
        return normalize_slug(explicit);
    }

    let title = metadata.get_string("title");
    if !title.is_empty() {
        return normalize_slug(title);
    }

    normalize_slug(&path_stem(path))
}

fn path_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if stem == "index" {
        if let Some(dir) = path.parent().and_then(Path::file_name) {
            return dir.to_string_lossy().into_owned();
        }
    }
    stem
}

/// Lowercase and replace spaces and path separators with hyphens
pub fn normalize_slug(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '-',
            c => c,
        })
        .collect()
}
