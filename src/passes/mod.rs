//! The catalog-building passes.
//!
//! ## Overview
//!
//! A run applies these passes in order, each one over the whole store:
//! 1. Discovery - List the organization's public repositories
//! 2. Union - Add repositories referenced by the curated list
//! 3. Languages - Attach per-language byte counts
//! 4. Readme - Extract README bodies into side-channel files
//! 5. Metadata - Extract `g0v.json` bodies into side-channel files
//!
//! Every pass loads `repo_info.json` at start and rewrites it at the end, so
//! any pass can be re-run on its own. Per-record failures are logged and
//! skipped; a later run picks them up again because the owned field is still
//! missing.

use std::fmt;
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::store::RecordStore;

pub mod contents;
pub mod discovery;
pub mod languages;
pub mod union;

/// Which pass produced a [`PassReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassName {
    Discovery,
    Union,
    Languages,
    Readme,
    Metadata,
}

impl fmt::Display for PassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PassName::Discovery => "discovery",
            PassName::Union => "union",
            PassName::Languages => "languages",
            PassName::Readme => "readme",
            PassName::Metadata => "metadata",
        };
        f.write_str(name)
    }
}

/// Counters for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub pass: PassName,
    /// Items looked at (listed repositories, curated URLs, or records)
    pub visited: usize,
    /// Records inserted or given a new field value
    pub updated: usize,
    /// Items left alone because of a skip
    pub skipped: usize,
}

impl PassReport {
    pub fn new(pass: PassName) -> Self {
        Self {
            pass,
            visited: 0,
            updated: 0,
            skipped: 0,
        }
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} visited, {} updated, {} skipped",
            self.pass, self.visited, self.updated, self.skipped
        )
    }
}

/// Load the store, let `pass` mutate it, and write it back in full.
pub(crate) fn with_store<F>(store_path: &Path, pass: F) -> Result<PassReport>
where
    F: FnOnce(&mut RecordStore) -> Result<PassReport>,
{
    let mut store = RecordStore::load(store_path)?;
    let report = pass(&mut store)?;
    store.save(store_path)?;
    info!("{report}; wrote {} records", store.len());
    Ok(report)
}
