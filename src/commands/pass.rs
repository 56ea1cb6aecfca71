//! Pass command implementation
//!
//! Runs a single stage of the pipeline against the working snapshot. Useful
//! to resume a run that stopped half-way or to refresh one kind of data.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use repo_catalog::client::ApiClient;
use repo_catalog::content::ContentKind;
use repo_catalog::curated::{AwesomeListSource, CuratedSource, FileSource};
use repo_catalog::defaults::DEFAULT_CURATED_RAW_BASE;
use repo_catalog::output::{emoji, pass_line, publish_line, OutputConfig};
use repo_catalog::passes::{contents, discovery, languages};
use repo_catalog::pipeline;
use repo_catalog::publish::{DefaultGitOperations, SnapshotPublisher};

use super::SettingsArgs;

/// The stage to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// List the organization's public repositories
    Discover,
    /// Add the repositories of the curated list
    Union,
    /// Fetch the language breakdown of every repository
    Languages,
    /// Extract every repository's README
    Readme,
    /// Extract every repository's g0v.json
    Metadata,
    /// Commit the working snapshot to the backup repository
    Publish,
}

/// Arguments for the pass command
#[derive(Args, Debug)]
pub struct PassArgs {
    /// The stage to run
    #[arg(value_enum)]
    pub stage: Stage,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Use an already generated curated list (awesome-g0v.json) for the union stage
    #[arg(long, value_name = "FILE")]
    pub curated_list: Option<PathBuf>,

    /// Raw-content URL of the curated list repository
    #[arg(
        long,
        value_name = "URL",
        env = "REPO_CATALOG_CURATED_BASE",
        default_value = DEFAULT_CURATED_RAW_BASE
    )]
    pub curated_base: String,
}

/// Execute the pass command
pub fn execute(args: PassArgs, output: &OutputConfig) -> Result<()> {
    let settings = args.settings.resolve()?;
    let store_path = settings.store_path();
    let work_dir = settings.work_dir();
    fs::create_dir_all(&work_dir)
        .with_context(|| format!("Failed to create {}", work_dir.display()))?;

    let client = ApiClient::new(&settings.api_base, &settings.token)?;
    let report = match args.stage {
        Stage::Discover => discovery::execute(&client, &settings.organization, &store_path)?,
        Stage::Union => {
            let curated: Box<dyn CuratedSource> = match &args.curated_list {
                Some(path) => Box::new(FileSource::new(path)),
                None => Box::new(AwesomeListSource::new(
                    &args.curated_base,
                    &settings.curated_dir(),
                )),
            };
            match pipeline::run_union(&client, curated.as_ref(), &store_path)? {
                Ok(report) => report,
                Err(reason) => {
                    println!(
                        "{} Curated list unavailable: {reason}",
                        emoji(output, "⚠️ ", "[WARN]")
                    );
                    return Ok(());
                }
            }
        }
        Stage::Languages => languages::execute(&client, &store_path)?,
        Stage::Readme => contents::execute(&client, ContentKind::Readme, &store_path, &work_dir)?,
        Stage::Metadata => {
            contents::execute(&client, ContentKind::Metadata, &store_path, &work_dir)?
        }
        Stage::Publish => {
            let mut git_ops = DefaultGitOperations::new();
            if let Some((name, email)) = &settings.commit_author {
                git_ops = git_ops.with_author(name, email);
            }
            let publisher =
                SnapshotPublisher::with_operations(Box::new(git_ops), &settings.backup_repo);
            let outcome = publisher.publish(&work_dir, &settings.clone_dir())?;
            println!("{}", publish_line(output, &outcome));
            return Ok(());
        }
    };

    println!("{}", pass_line(output, &report));
    Ok(())
}
