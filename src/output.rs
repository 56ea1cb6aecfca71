//! # Output Configuration
//!
//! Controls how command summaries look. Colors and emoji are used only when
//! the terminal and the user allow it:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use crate::passes::PassReport;
use crate::publish::PublishOutcome;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `always` and `never` win over the environment; anything else detects.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// One summary line for a finished pass.
pub fn pass_line(config: &OutputConfig, report: &PassReport) -> String {
    let marker = if report.skipped == 0 {
        emoji(config, "✅", "[OK]")
    } else {
        emoji(config, "⚠️ ", "[WARN]")
    };
    format!("{marker} {report}")
}

/// One summary line for a publish.
pub fn publish_line(config: &OutputConfig, outcome: &PublishOutcome) -> String {
    match outcome {
        PublishOutcome::Unchanged => format!(
            "{} Backup already up to date, nothing committed",
            emoji(config, "💤", "[SKIP]")
        ),
        PublishOutcome::Committed { changed } => format!(
            "{} Committed and pushed {} changed file(s)",
            emoji(config, "📦", "[PUSH]"),
            changed.len()
        ),
    }
}
