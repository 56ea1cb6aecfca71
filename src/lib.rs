//! # Repository Catalog Library
//!
//! This library builds and backs up a catalog of an organization's GitHub
//! repositories. It is designed to be driven by the `repo-catalog`
//! command-line tool, typically from a scheduled job.
//!
//! ## Quick Example
//!
//! ```
//! use repo_catalog::content::{content_filename, parse_content_filename, ContentKind};
//! use repo_catalog::passes::union::full_name_from_url;
//!
//! let full_name = full_name_from_url("https://github.com/g0v/moedict").unwrap();
//! assert_eq!(full_name, "g0v/moedict");
//!
//! let filename = content_filename(&full_name, ContentKind::Readme, "README.md");
//! assert_eq!(filename, "g0v`moedict`README.md");
//! assert_eq!(
//!     parse_content_filename(&filename),
//!     Some((full_name, ContentKind::Readme))
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Record store (`store`)**: `repo_info.json`, one record per repository
//!   keyed by `owner/repo`, merged non-destructively and rewritten atomically.
//! - **Fetch client (`client`)**: the GitHub API behind the `Fetch` trait.
//!   Failed requests are skips, never errors.
//! - **Passes (`passes`)**: discovery, union, languages, README and metadata
//!   extraction. Each pass loads the store, updates the fields it owns and
//!   writes the store back.
//! - **Curated list (`curated`)**: the external list of extra repositories.
//! - **Publishing (`publish`, `git`)**: copies the snapshot into a clone of
//!   the backup repository and commits only when something changed.
//!
//! ## Execution Flow
//!
//! `pipeline::execute` runs: Discovery → Union → Languages → README →
//! Metadata → Publish → cleanup.

pub mod client;
pub mod config;
pub mod content;
pub mod curated;
pub mod defaults;
pub mod error;
pub mod git;
pub mod output;
pub mod passes;
pub mod pipeline;
pub mod publish;
pub mod store;

#[cfg(test)]
mod content_proptest;
