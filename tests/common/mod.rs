//! Shared test utilities for integration and E2E tests.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_store(stores::TWO_RECORDS);
//! fixture.command().arg("ls").assert().success();
//! ```

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::stores;
    pub use super::TestFixture;
}

/// `repo_info.json` snippets.
#[allow(dead_code)]
pub mod stores {
    pub const TWO_RECORDS: &str = r#"{
  "g0v/moedict": {
    "name": "moedict",
    "description": "dictionary",
    "url": "https://api.github.com/repos/g0v/moedict",
    "html_url": "https://github.com/g0v/moedict",
    "updated_at": "2024-03-01T00:00:00Z",
    "languages": {"JavaScript": 1200, "Shell": 40},
    "readme_filename": "g0v`moedict`README.md"
  },
  "g0v/twreporter": {
    "name": "twreporter",
    "url": "https://api.github.com/repos/g0v/twreporter",
    "html_url": "https://github.com/g0v/twreporter",
    "updated_at": "2023-01-01T00:00:00Z"
  }
}
"#;
}

/// A data directory in a temporary location.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `config.json` into the data directory.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("config.json")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Write the working `repo_info.json`.
    pub fn with_store(self, content: &str) -> Self {
        self.temp_dir
            .child("temp/repo_info.json")
            .write_str(content)
            .expect("Failed to write store");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn work_dir(&self) -> PathBuf {
        self.path().join("temp")
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// The binary with `--data-dir` pointing at the fixture and a clean
    /// environment for the variables it reads.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("repo-catalog");
        cmd.env_remove("GITHUB_TOKEN")
            .env_remove("REPO_CATALOG_CONFIG")
            .env_remove("REPO_CATALOG_BACKUP_REPO")
            .env_remove("REPO_CATALOG_API_BASE")
            .env_remove("REPO_CATALOG_CURATED_BASE")
            .env("REPO_CATALOG_DATA_DIR", self.path())
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
