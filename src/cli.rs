//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Repository Catalog - Catalog an organization's repositories and back them up
#[derive(Parser, Debug)]
#[command(name = "repo-catalog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        env = "REPO_CATALOG_LOG"
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the whole pipeline: discover, enrich, publish, clean up
    Run(commands::run::RunArgs),

    /// Run a single pass against the working snapshot
    Pass(commands::pass::PassArgs),

    /// List the records in the working snapshot
    Ls(commands::ls::LsArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = repo_catalog::output::OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Run(args) => commands::run::execute(args, &output),
            Commands::Pass(args) => commands::pass::execute(args, &output),
            Commands::Ls(args) => commands::ls::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Log to stderr as "time message", filtered by `level`.
fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder
        .parse_filters(level)
        .format_timestamp_secs()
        .format_target(false);
    // A second initialisation only happens in tests.
    let _ = builder.try_init();
}
