//! # Ls Command Implementation
//!
//! Lists the records of the working snapshot together with what the
//! enrichment passes found for each one. Reads `repo_info.json` only, so it
//! needs neither a token nor network access.
//!
//! A finished run removes the working directory, so without one the
//! published copy in the backup clone is listed instead.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use log::debug;

use repo_catalog::config::{clone_dir_in, work_dir_in, ConfigFile, CONFIG_FILE_NAME};
use repo_catalog::defaults::default_data_dir;
use repo_catalog::output::{emoji, OutputConfig};
use repo_catalog::store::{RecordStore, RepositoryRecord, STORE_FILE_NAME};

/// List the records in the working snapshot
#[derive(Args, Debug, Default)]
pub struct LsArgs {
    /// Data directory holding the working snapshot.
    #[arg(long, value_name = "DIR", env = "REPO_CATALOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Read this repo_info.json instead of the one in the data directory.
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Backup repository whose clone is listed when there is no working snapshot.
    #[arg(long, value_name = "URL", env = "REPO_CATALOG_BACKUP_REPO")]
    pub backup_repo: Option<String>,

    /// Show the primary language and which content files were found.
    #[arg(short, long)]
    pub long: bool,

    /// Sort order for the listing.
    #[arg(short, long, value_enum, default_value = "name")]
    pub sort: SortOrder,

    /// Show only the number of records.
    #[arg(long)]
    pub count: bool,

    /// Reverse the sort order.
    #[arg(short, long)]
    pub reverse: bool,
}

/// Sort order options for the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SortOrder {
    /// Sort by `owner/repo`
    #[default]
    Name,
    /// Most recently updated last
    Updated,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs, output: &OutputConfig) -> Result<()> {
    let store_path = store_path(&args)?;
    let store = RecordStore::load(&store_path)
        .with_context(|| format!("Failed to read {}", store_path.display()))?;

    // BTreeMap order is already by name
    let mut records: Vec<(&String, &RepositoryRecord)> = store.iter().collect();
    if args.sort == SortOrder::Updated {
        records.sort_by(|a, b| a.1.updated_at.cmp(&b.1.updated_at).then(a.0.cmp(b.0)));
    }
    if args.reverse {
        records.reverse();
    }

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    if records.is_empty() {
        println!("No repositories in {}", store_path.display());
        return Ok(());
    }

    for (full_name, record) in &records {
        if args.long {
            println!("{}", format_long(output, full_name, record));
        } else {
            println!("{full_name}");
        }
    }

    println!();
    println!(
        "{} repositories, {} with README, {} with g0v.json",
        records.len(),
        records.iter().filter(|(_, r)| r.readme_filename.is_some()).count(),
        records.iter().filter(|(_, r)| r.g0vjson_filename.is_some()).count()
    );

    Ok(())
}

/// The store to list: `--store`, else the working snapshot, else the one
/// published in the backup clone.
fn store_path(args: &LsArgs) -> Result<PathBuf> {
    if let Some(path) = &args.store {
        if !path.exists() {
            anyhow::bail!("Store file not found: {}", path.display());
        }
        return Ok(path.clone());
    }

    let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);
    let working = work_dir_in(&data_dir).join(STORE_FILE_NAME);
    if working.exists() {
        return Ok(working);
    }
    match published_store(&data_dir, args.backup_repo.as_deref()) {
        Some(path) if path.exists() => Ok(path),
        _ => Ok(working),
    }
}

fn published_store(data_dir: &Path, backup_repo: Option<&str>) -> Option<PathBuf> {
    let backup_repo = match backup_repo {
        Some(url) => url.to_string(),
        None => match ConfigFile::from_file(&data_dir.join(CONFIG_FILE_NAME)) {
            Ok(config) => config.backup_repo?,
            Err(e) => {
                debug!("not looking for a published snapshot: {e}");
                return None;
            }
        },
    };
    clone_dir_in(data_dir, &backup_repo).map(|dir| dir.join(STORE_FILE_NAME))
}

/// The language with the most bytes, if languages were fetched.
fn primary_language(record: &RepositoryRecord) -> Option<&str> {
    record
        .languages
        .as_ref()?
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(name, _)| name.as_str())
}

fn format_long(output: &OutputConfig, full_name: &str, record: &RepositoryRecord) -> String {
    let flag = |present: bool| {
        if present {
            emoji(output, "✓", "y")
        } else {
            emoji(output, "·", "-")
        }
    };
    format!(
        "{:<40} {:<12} readme:{} g0v.json:{} {}",
        full_name,
        primary_language(record).unwrap_or("-"),
        flag(record.readme_filename.is_some()),
        flag(record.g0vjson_filename.is_some()),
        record.updated_at
    )
}
