//! # Error Handling
//!
//! This module defines the centralized error type for `repo-catalog`. It uses
//! `thiserror` to describe every failure that is allowed to terminate a run.
//!
//! Per-item failures during discovery and enrichment never become an `Error`:
//! the fetch client reports them as a skip and the pass moves on. What is left
//! for this enum is the fatal taxonomy:
//!
//! - Missing or unreadable configuration.
//! - Git clone and git command failures while publishing a snapshot.
//! - Record store and side-channel file I/O.
//! - Curated list generation that failed unexpectedly (as opposed to being
//!   merely unavailable, see [`crate::curated::CuratedList`]).
//! - JSON and URL parsing errors.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for repo-catalog operations
#[derive(Error, Debug)]
pub enum Error {
    /// A mandatory configuration value was not provided.
    #[error("Missing configuration: {key}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigMissing {
        key: String,
        /// Optional hint for where the value can be supplied
        hint: Option<String>,
    },

    /// The configuration file exists but could not be parsed.
    #[error("Configuration parsing error in {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// An error occurred while cloning the backup repository.
    #[error("Git clone error for {url}: {message}")]
    GitClone { url: String, message: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {}: {command} - {stderr}", dir.display())]
    GitCommand {
        command: String,
        dir: PathBuf,
        stderr: String,
    },

    /// The record store could not be read or written.
    #[error("Record store error at {}: {message}", path.display())]
    Store { path: PathBuf, message: String },

    /// The backup clone would overwrite the directory being published.
    #[error("Clone directory {} is the working directory", path.display())]
    CloneOverWorkDir { path: PathBuf },

    /// Curated list generation failed in a way that should abort the run.
    #[error("Curated list error: {message}")]
    CuratedList { message: String },

    /// An I/O error with the path it happened on.
    #[error("I/O error at {}: {source}", path.display())]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience constructor for [`Error::PathIo`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
    Error::PathIo {
        path: path.into(),
        source,
    }
}
