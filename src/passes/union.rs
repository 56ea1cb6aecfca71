//! Pass 2: Union
//!
//! Adds repositories referenced by the curated list that discovery did not
//! already find. Existing records are never touched, and the membership check
//! happens before any request is made.

use std::path::Path;

use log::debug;
use url::Url;

use super::{with_store, PassName, PassReport};
use crate::client::Fetch;
use crate::error::Result;
use crate::store::{RecordStore, RepoSummary};

const GITHUB_HOSTS: [&str; 2] = ["github.com", "www.github.com"];

/// Derive `owner/repo` from a repository web URL on github.com.
///
/// Returns `None` for other hosts and for URLs that do not name a repository.
pub fn full_name_from_url(repository_url: &str) -> Option<String> {
    let url = Url::parse(repository_url.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    if !GITHUB_HOSTS.contains(&host.as_str()) {
        return None;
    }

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }
    Some(format!("{owner}/{repo}"))
}

/// Execute the union pass against the store at `store_path`.
pub fn execute(client: &dyn Fetch, urls: &[String], store_path: &Path) -> Result<PassReport> {
    with_store(store_path, |store| Ok(union(client, urls, store)))
}

/// Insert every curated repository that is not yet in `store`.
pub fn union(client: &dyn Fetch, urls: &[String], store: &mut RecordStore) -> PassReport {
    let mut report = PassReport::new(PassName::Union);

    for repository_url in urls {
        report.visited += 1;

        let Some(full_name) = full_name_from_url(repository_url) else {
            debug!("skipping {repository_url}: not a github.com repository");
            report.skipped += 1;
            continue;
        };
        if store.contains(&full_name) {
            continue;
        }

        let summary = match client
            .fetch(&format!("repos/{full_name}"))
            .and_then(|response| response.parse::<RepoSummary>())
        {
            Ok(summary) => summary,
            Err(skip) => {
                debug!("skipping {full_name}: {skip}");
                report.skipped += 1;
                continue;
            }
        };

        if store.insert_if_absent(&summary) {
            report.updated += 1;
        }
    }

    report
}
