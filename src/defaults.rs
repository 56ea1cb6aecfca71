//! Default values for repo-catalog configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Organization whose public repositories are catalogued.
pub const DEFAULT_ORGANIZATION: &str = "g0v";

/// GitHub REST API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Raw-content root of the curated list repository.
pub const DEFAULT_CURATED_RAW_BASE: &str =
    "https://raw.githubusercontent.com/g0v/awesome-g0v/master";

/// Returns the default data directory.
///
/// Uses the platform-appropriate local data directory:
/// - Linux: `~/.local/share/repo-catalog`
/// - macOS: `~/Library/Application Support/repo-catalog`
/// - Windows: `{FOLDERID_LocalAppData}\repo-catalog`
///
/// Falls back to `_data` in the current directory if the platform data
/// directory cannot be determined.
///
/// This can be overridden by the `--data-dir` CLI flag or the
/// `REPO_CATALOG_DATA_DIR` environment variable.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("repo-catalog"))
        .unwrap_or_else(|| PathBuf::from("_data"))
}
