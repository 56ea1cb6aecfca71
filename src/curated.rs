//! # Curated Repository List
//!
//! The union pass consumes a list of repository URLs curated outside this
//! tool. The list is produced by the curated repository's own LiveScript
//! parser: its `readme.md` and `parse.ls` are downloaded into a scratch
//! directory and `lsc parse.ls` writes `awesome-g0v.json` there.
//!
//! Generation can fail in two very different ways, and [`CuratedSource`]
//! keeps them apart:
//!
//! - `Ok(CuratedList::Unavailable(_))`: the list could not be produced in this
//!   environment (no `lsc`, a download failed, no output). The caller skips
//!   the union pass.
//! - `Err(_)`: the generator ran and produced something broken. The caller
//!   aborts.

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;
use serde::Deserialize;

use crate::error::{io_err, Error, Result};

/// File the curated parser writes.
pub const CURATED_OUTPUT: &str = "awesome-g0v.json";

/// Result of asking a [`CuratedSource`] for its URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CuratedList {
    Available(Vec<String>),
    Unavailable(String),
}

/// Trait for curated list providers - allows substituting a fixed list
pub trait CuratedSource {
    fn repository_urls(&self) -> Result<CuratedList>;
}

#[derive(Debug, Deserialize)]
struct CuratedEntry {
    #[serde(default)]
    repository: Option<serde_json::Value>,
}

/// Parse the curated parser's JSON output into repository URLs.
///
/// Entries without a string `repository` are ignored.
pub fn parse_curated_json(json: &str) -> Result<Vec<String>> {
    let entries: Vec<CuratedEntry> =
        serde_json::from_str(json).map_err(|e| Error::CuratedList {
            message: format!("malformed {CURATED_OUTPUT}: {e}"),
        })?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry.repository {
            Some(serde_json::Value::String(url)) if !url.trim().is_empty() => Some(url),
            _ => None,
        })
        .collect())
}

/// Reads an already generated list from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CuratedSource for FileSource {
    fn repository_urls(&self) -> Result<CuratedList> {
        let json = fs::read_to_string(&self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(CuratedList::Available(parse_curated_json(&json)?))
    }
}

/// Downloads the curated list repository's parser and runs it.
#[derive(Debug, Clone)]
pub struct AwesomeListSource {
    agent: ureq::Agent,
    raw_base: String,
    scratch_dir: PathBuf,
    program: String,
}

impl AwesomeListSource {
    /// `raw_base` is the raw-content URL of the curated repository's branch.
    pub fn new(raw_base: &str, scratch_dir: &Path) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            raw_base: raw_base.trim_end_matches('/').to_string(),
            scratch_dir: scratch_dir.to_path_buf(),
            program: "lsc".to_string(),
        }
    }

    /// Use another LiveScript compiler binary.
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Download `name` into the scratch directory.
    ///
    /// Returns the reason when the file cannot be fetched.
    fn download(&self, name: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", self.raw_base, name);
        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(e) => return Ok(Some(format!("download of {url} failed: {e}"))),
        };

        let mut body = Vec::new();
        if let Err(e) = response.into_reader().read_to_end(&mut body) {
            return Ok(Some(format!("download of {url} failed: {e}")));
        }
        let path = self.scratch_dir.join(name);
        fs::write(&path, body).map_err(|e| io_err(&path, e))?;
        Ok(None)
    }
}

impl CuratedSource for AwesomeListSource {
    fn repository_urls(&self) -> Result<CuratedList> {
        fs::create_dir_all(&self.scratch_dir).map_err(|e| io_err(&self.scratch_dir, e))?;

        for name in ["readme.md", "parse.ls"] {
            if let Some(reason) = self.download(name)? {
                return Ok(CuratedList::Unavailable(reason));
            }
        }

        info!("generating {CURATED_OUTPUT}");
        let output = match Command::new(&self.program)
            .arg("parse.ls")
            .current_dir(&self.scratch_dir)
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(CuratedList::Unavailable(format!(
                    "`{}` is not installed",
                    self.program
                )))
            }
            Err(e) => {
                return Err(Error::CuratedList {
                    message: format!("failed to run {}: {e}", self.program),
                })
            }
        };

        if !output.status.success() {
            return Err(Error::CuratedList {
                message: format!(
                    "{} parse.ls exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let generated = self.scratch_dir.join(CURATED_OUTPUT);
        if !generated.exists() {
            return Ok(CuratedList::Unavailable(format!(
                "{} did not produce {CURATED_OUTPUT}",
                self.program
            )));
        }
        FileSource::new(generated).repository_urls()
    }
}
