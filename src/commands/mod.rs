//! # CLI Command Implementations
//!
//! Each subcommand of `repo-catalog` lives in its own file with an `Args`
//! struct derived using `clap` and an `execute` function that calls into the
//! `repo_catalog` library.
//!
//! The arguments shared by every command that touches the catalog are
//! collected in [`SettingsArgs`] and flattened into each command's `Args`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use repo_catalog::config::{ConfigFile, Overrides, Settings, CONFIG_FILE_NAME};
use repo_catalog::defaults::default_data_dir;

pub mod completions;
pub mod ls;
pub mod pass;
pub mod run;

/// Where the catalog lives and how to reach GitHub and the backup repository.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Data directory holding config.json, the working snapshot and the backup clone.
    ///
    /// Defaults to the platform data directory (`~/.local/share/repo-catalog`
    /// on Linux).
    #[arg(long, value_name = "DIR", env = "REPO_CATALOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to the configuration file (defaults to <DATA_DIR>/config.json)
    #[arg(short, long, value_name = "FILE", env = "REPO_CATALOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// GitHub access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// URL of the backup repository
    #[arg(long, value_name = "URL", env = "REPO_CATALOG_BACKUP_REPO")]
    pub backup_repo: Option<String>,

    /// Organization whose public repositories are catalogued
    #[arg(long, value_name = "ORG")]
    pub organization: Option<String>,

    /// GitHub API base URL
    #[arg(long, value_name = "URL", env = "REPO_CATALOG_API_BASE")]
    pub api_base: Option<String>,
}

impl SettingsArgs {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Read the configuration file and apply the command-line overrides.
    pub fn resolve(&self) -> Result<Settings> {
        let data_dir = self.data_dir();
        let config_path = self
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
        if self.config.is_some() && !config_path.exists() {
            anyhow::bail!("Configuration file not found: {}", config_path.display());
        }

        let file = ConfigFile::from_file(&config_path)?;
        let overrides = Overrides {
            token: self.token.clone(),
            backup_repo: self.backup_repo.clone(),
            organization: self.organization.clone(),
            api_base: self.api_base.clone(),
        };
        Ok(Settings::resolve(file, overrides, &data_dir)?)
    }
}
