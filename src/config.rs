//! # Configuration
//!
//! Settings come from `<data_dir>/config.json`, with command-line flags and
//! environment variables taking precedence over the file:
//!
//! ```json
//! {
//!   "token": "ghp_...",
//!   "backup_repo": "git@github.com:g0v/repo-backup.git",
//!   "organization": "g0v",
//!   "api_base": "https://api.github.com",
//!   "commit_author_name": "catalog bot",
//!   "commit_author_email": "bot@example.org"
//! }
//! ```
//!
//! `token` and `backup_repo` are mandatory. [`Settings::resolve`] fails
//! before anything touches the network when either is missing.
//!
//! The data directory is laid out as follows:
//!
//! - `temp/`: the working snapshot (`repo_info.json` and content files)
//! - `awesome/`: scratch space for curated list generation
//! - `<backup repo name>/`: the backup clone

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::defaults::{DEFAULT_API_BASE, DEFAULT_ORGANIZATION};
use crate::error::{io_err, Error, Result};
use crate::store::STORE_FILE_NAME;

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Raw contents of `config.json`. Every key is optional here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub backup_repo: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub commit_author_name: Option<String>,
    #[serde(default)]
    pub commit_author_email: Option<String>,
}

impl ConfigFile {
    /// Parse a configuration document.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read `path`, or return an empty configuration if it does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        Self::parse(&content, path)
    }
}

/// Values that override the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub backup_repo: Option<String>,
    pub organization: Option<String>,
    pub api_base: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: String,
    pub backup_repo: String,
    pub organization: String,
    pub api_base: String,
    pub commit_author: Option<(String, String)>,
    pub data_dir: PathBuf,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Merge overrides over the file and check mandatory values.
    pub fn resolve(file: ConfigFile, overrides: Overrides, data_dir: &Path) -> Result<Self> {
        let token = non_empty(overrides.token)
            .or(non_empty(file.token))
            .ok_or_else(|| Error::ConfigMissing {
                key: "token".to_string(),
                hint: Some(format!(
                    "set \"token\" in {} or pass --token / GITHUB_TOKEN",
                    data_dir.join(CONFIG_FILE_NAME).display()
                )),
            })?;
        let backup_repo = non_empty(overrides.backup_repo)
            .or(non_empty(file.backup_repo))
            .ok_or_else(|| Error::ConfigMissing {
                key: "backup_repo".to_string(),
                hint: Some(format!(
                    "set \"backup_repo\" in {} or pass --backup-repo / REPO_CATALOG_BACKUP_REPO",
                    data_dir.join(CONFIG_FILE_NAME).display()
                )),
            })?;

        match backup_repo_name(&backup_repo) {
            None => {
                return Err(Error::ConfigParse {
                    path: data_dir.join(CONFIG_FILE_NAME),
                    message: format!(
                        "cannot derive a directory name from backup_repo {backup_repo:?}"
                    ),
                });
            }
            Some(name) if is_reserved_dir_name(&name) => {
                return Err(Error::ConfigParse {
                    path: data_dir.join(CONFIG_FILE_NAME),
                    message: format!(
                        "backup_repo {backup_repo:?} would be cloned into the {name:?} working directory"
                    ),
                });
            }
            Some(_) => {}
        }

        let commit_author = match (
            non_empty(file.commit_author_name),
            non_empty(file.commit_author_email),
        ) {
            (Some(name), Some(email)) => Some((name, email)),
            _ => None,
        };

        Ok(Self {
            token,
            backup_repo,
            organization: non_empty(overrides.organization)
                .or(non_empty(file.organization))
                .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string()),
            api_base: non_empty(overrides.api_base)
                .or(non_empty(file.api_base))
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            commit_author,
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Working directory holding the snapshot and content files.
    pub fn work_dir(&self) -> PathBuf {
        work_dir_in(&self.data_dir)
    }

    /// Scratch directory for curated list generation.
    pub fn curated_dir(&self) -> PathBuf {
        self.data_dir.join(CURATED_DIR_NAME)
    }

    /// Path of the working `repo_info.json`.
    pub fn store_path(&self) -> PathBuf {
        self.work_dir().join(STORE_FILE_NAME)
    }

    /// Directory of the backup clone.
    pub fn clone_dir(&self) -> PathBuf {
        // validated in `resolve`
        clone_dir_in(&self.data_dir, &self.backup_repo)
            .unwrap_or_else(|| self.data_dir.join("backup"))
    }
}

/// Name of the working directory under the data directory.
pub const WORK_DIR_NAME: &str = "temp";

/// Name of the curated list scratch directory under the data directory.
pub const CURATED_DIR_NAME: &str = "awesome";

fn is_reserved_dir_name(name: &str) -> bool {
    name == WORK_DIR_NAME || name == CURATED_DIR_NAME
}

/// Working directory under `data_dir`.
pub fn work_dir_in(data_dir: &Path) -> PathBuf {
    data_dir.join(WORK_DIR_NAME)
}

/// Clone directory of `backup_repo` under `data_dir`.
///
/// `None` when no name can be derived or the name is one of the working
/// directories.
pub fn clone_dir_in(data_dir: &Path, backup_repo: &str) -> Option<PathBuf> {
    backup_repo_name(backup_repo)
        .filter(|name| !is_reserved_dir_name(name))
        .map(|name| data_dir.join(name))
}

/// Directory name for a backup repository URL: its last path segment
/// without the `.git` suffix.
///
/// Works for both `https://host/org/repo.git` and `git@host:org/repo.git`.
pub fn backup_repo_name(url: &str) -> Option<String> {
    let last = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()?
        .trim();
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
