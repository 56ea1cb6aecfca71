//! Side-channel content files.
//!
//! README and metadata bodies are not embedded in the catalog. Each one is
//! written next to `repo_info.json` under a name derived from the owning
//! repository: the `/` in `full_name` becomes a backtick and the original
//! filename is appended after another backtick, e.g. ``g0v`moedict`README.md``.
//! GitHub owner and repository names cannot contain a backtick, so every name
//! maps back to exactly one `(full_name, kind)` pair.

use std::fmt;

/// Separator that stands in for `/` in content filenames.
pub const MARKER: char = '`';

/// Repository-relative path of the metadata file.
pub const METADATA_FILE: &str = "g0v.json";

/// The two kinds of side-channel content the catalog collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Readme,
    Metadata,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Readme, ContentKind::Metadata];

    /// Sub-resource of the repository API URL to fetch.
    pub fn sub_resource(self) -> &'static str {
        match self {
            ContentKind::Readme => "readme",
            ContentKind::Metadata => "contents/g0v.json",
        }
    }

    /// Suffix appended to the key-derived prefix.
    ///
    /// READMEs keep whatever name the repository uses; the metadata file
    /// always has the same name.
    pub fn suffix<'a>(self, upstream_name: &'a str) -> &'a str {
        match self {
            ContentKind::Readme => upstream_name,
            ContentKind::Metadata => METADATA_FILE,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        if suffix == METADATA_FILE {
            Some(ContentKind::Metadata)
        } else if suffix.to_ascii_lowercase().starts_with("readme") {
            Some(ContentKind::Readme)
        } else {
            None
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Readme => write!(f, "readme"),
            ContentKind::Metadata => write!(f, "metadata"),
        }
    }
}

/// Derive the side-channel filename for `full_name`.
pub fn content_filename(full_name: &str, kind: ContentKind, upstream_name: &str) -> String {
    let mut filename = full_name.replace('/', &MARKER.to_string());
    filename.push(MARKER);
    filename.push_str(kind.suffix(upstream_name));
    filename
}

/// Recover `(full_name, kind)` from a side-channel filename.
///
/// Returns `None` for names this crate did not produce, including
/// `repo_info.json` itself.
pub fn parse_content_filename(filename: &str) -> Option<(String, ContentKind)> {
    let mut parts = filename.splitn(3, MARKER);
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let suffix = parts.next()?;
    let kind = ContentKind::from_suffix(suffix)?;
    Some((format!("{owner}/{repo}"), kind))
}
