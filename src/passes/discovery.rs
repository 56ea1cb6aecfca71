//! Pass 1: Discovery
//!
//! Walks the organization's public repository listing page by page and
//! upserts each repository's whitelisted fields into the store.
//!
//! Pagination follows the `next` link until there is none. A page that cannot
//! be fetched ends the walk for this run; whatever was collected so far is
//! still written.

use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use super::{with_store, PassName, PassReport};
use crate::client::Fetch;
use crate::error::Result;
use crate::store::{RecordStore, RepoSummary};

/// Listing endpoint for an organization's public repositories.
pub fn listing_path(organization: &str) -> String {
    format!("orgs/{organization}/repos?type=public")
}

/// Execute the discovery pass against the store at `store_path`.
pub fn execute(client: &dyn Fetch, organization: &str, store_path: &Path) -> Result<PassReport> {
    with_store(store_path, |store| Ok(discover(client, organization, store)))
}

/// Upsert every listed repository of `organization` into `store`.
pub fn discover(client: &dyn Fetch, organization: &str, store: &mut RecordStore) -> PassReport {
    let mut report = PassReport::new(PassName::Discovery);
    let mut target = Some(listing_path(organization));

    while let Some(url) = target.take() {
        let page = match client.fetch(&url) {
            Ok(page) => page,
            Err(skip) => {
                warn!("listing page {url} failed ({skip}); stopping discovery");
                break;
            }
        };
        target = page.next.clone();

        let Value::Array(items) = page.body else {
            warn!("listing page {url} is not an array; stopping discovery");
            break;
        };

        for item in items {
            report.visited += 1;
            match serde_json::from_value::<RepoSummary>(item) {
                Ok(summary) => {
                    store.upsert_summary(&summary);
                    report.updated += 1;
                }
                Err(e) => {
                    debug!("skipping listing entry: {e}");
                    report.skipped += 1;
                }
            }
        }
    }

    report
}
