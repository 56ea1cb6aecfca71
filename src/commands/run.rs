//! Run command implementation
//!
//! The run command executes the full pipeline:
//! 1. Discovery of the organization's repositories
//! 2. Union with the curated list
//! 3. Language, README and metadata enrichment
//! 4. Publishing to the backup repository
//! 5. Cleaning up the working directories

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;

use repo_catalog::client::ApiClient;
use repo_catalog::curated::{AwesomeListSource, CuratedSource, FileSource};
use repo_catalog::defaults::DEFAULT_CURATED_RAW_BASE;
use repo_catalog::output::{emoji, pass_line, publish_line, OutputConfig};
use repo_catalog::pipeline::{self, RunOptions};
use repo_catalog::publish::{DefaultGitOperations, SnapshotPublisher};

use super::SettingsArgs;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Use an already generated curated list (awesome-g0v.json) instead of generating one
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

    /// Do not add repositories from the curated list
    #[arg(long)]
    pub skip_union: bool,

    /// Build the snapshot but do not publish it
    #[arg(long)]
    pub no_publish: bool,

    /// Keep the working directories after publishing
    #[arg(long)]
    pub keep_workspace: bool,

    /// Suppress the summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the run command
pub fn execute(args: RunArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();
    let settings = args.settings.resolve()?;

    let client = ApiClient::new(&settings.api_base, &settings.token)?;
    let curated: Box<dyn CuratedSource> = match &args.curated_list {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(AwesomeListSource::new(
            &args.curated_base,
            &settings.curated_dir(),
        )),
    };

    let mut git_ops = DefaultGitOperations::new();
    if let Some((name, email)) = &settings.commit_author {
        git_ops = git_ops.with_author(name, email);
    }
    let publisher = SnapshotPublisher::with_operations(Box::new(git_ops), &settings.backup_repo);

    let options = RunOptions {
        skip_union: args.skip_union,
        no_publish: args.no_publish,
        keep_workspace: args.keep_workspace,
    };

    if !args.quiet {
        println!(
            "{} Cataloguing {} into {}",
            emoji(output, "🔍", "[SCAN]"),
            settings.organization,
            settings.data_dir.display()
        );
    }

    let report = pipeline::execute(&settings, &client, curated.as_ref(), &publisher, &options)?;

    if !args.quiet {
        for pass in &report.passes {
            println!("   {}", pass_line(output, pass));
        }
        if let Some(reason) = &report.union_skipped {
            println!("   union skipped: {reason}");
        }
        match &report.publish {
            Some(outcome) => println!("{}", publish_line(output, outcome)),
            None => println!(
                "Snapshot left in {}",
                settings.work_dir().display()
            ),
        }
        println!(
            "{} Finished in {:.2}s",
            emoji(output, "✅", "[DONE]"),
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
