//! Orchestrator for a complete catalog run
//!
//! Runs every pass in order over the working snapshot, publishes the result
//! and cleans up the scratch directories:
//! 1. Discovery of the organization's repositories
//! 2. Union with the curated list (skipped when the list is unavailable)
//! 3. Language enrichment
//! 4. README extraction
//! 5. Metadata-file extraction
//! 6. Publishing to the backup repository
//! 7. Removing the working and curated scratch directories

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::client::Fetch;
use crate::config::Settings;
use crate::content::ContentKind;
use crate::curated::{CuratedList, CuratedSource};
use crate::error::{io_err, Result};
use crate::passes::{contents, discovery, languages, union, PassReport};
use crate::publish::{PublishOutcome, SnapshotPublisher};

/// Knobs for a run that are not part of the configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Do not consult the curated list at all.
    pub skip_union: bool,
    /// Stop after the passes; leave the working snapshot in place.
    pub no_publish: bool,
    /// Keep the working and curated directories after publishing.
    pub keep_workspace: bool,
}

/// Everything a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub passes: Vec<PassReport>,
    /// Why the union pass did not run, if it did not.
    pub union_skipped: Option<String>,
    pub publish: Option<PublishOutcome>,
}

/// Execute the union pass if the curated source can provide a list.
///
/// Returns the pass report, or the reason the list was unavailable.
pub fn run_union(
    client: &dyn Fetch,
    curated: &dyn CuratedSource,
    store_path: &Path,
) -> Result<std::result::Result<PassReport, String>> {
    match curated.repository_urls()? {
        CuratedList::Available(urls) => {
            info!("curated list has {} repositories", urls.len());
            Ok(Ok(union::execute(client, &urls, store_path)?))
        }
        CuratedList::Unavailable(reason) => {
            warn!("curated list unavailable, skipping union: {reason}");
            Ok(Err(reason))
        }
    }
}

/// Run the five passes over the working snapshot.
pub fn run_passes(
    settings: &Settings,
    client: &dyn Fetch,
    curated: &dyn CuratedSource,
    options: &RunOptions,
) -> Result<(Vec<PassReport>, Option<String>)> {
    let store_path = settings.store_path();
    let work_dir = settings.work_dir();
    fs::create_dir_all(&work_dir).map_err(|e| io_err(&work_dir, e))?;

    let mut reports = vec![discovery::execute(
        client,
        &settings.organization,
        &store_path,
    )?];

    let mut union_skipped = None;
    if options.skip_union {
        union_skipped = Some("disabled".to_string());
    } else {
        match run_union(client, curated, &store_path)? {
            Ok(report) => reports.push(report),
            Err(reason) => union_skipped = Some(reason),
        }
    }

    reports.push(languages::execute(client, &store_path)?);
    for kind in ContentKind::ALL {
        reports.push(contents::execute(client, kind, &store_path, &work_dir)?);
    }

    Ok((reports, union_skipped))
}

/// Execute the complete run.
pub fn execute(
    settings: &Settings,
    client: &dyn Fetch,
    curated: &dyn CuratedSource,
    publisher: &SnapshotPublisher,
    options: &RunOptions,
) -> Result<RunReport> {
    let (passes, union_skipped) = run_passes(settings, client, curated, options)?;

    if options.no_publish {
        return Ok(RunReport {
            passes,
            union_skipped,
            publish: None,
        });
    }

    let outcome = publisher.publish(&settings.work_dir(), &settings.clone_dir())?;

    if !options.keep_workspace {
        cleanup(settings)?;
    }

    Ok(RunReport {
        passes,
        union_skipped,
        publish: Some(outcome),
    })
}

/// Remove the working and curated scratch directories.
pub fn cleanup(settings: &Settings) -> Result<()> {
    for dir in [settings.curated_dir(), settings.work_dir()] {
        if dir.exists() {
            info!("remove {}", dir.display());
            fs::remove_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        }
    }
    Ok(())
}
