//! Pass 3: Languages
//!
//! Attaches the `languages` breakdown (language name to byte count) to every
//! record. The mapping is stored exactly as the API returns it.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use super::{with_store, PassName, PassReport};
use crate::client::{sub_resource_url, Fetch};
use crate::error::Result;
use crate::store::RecordStore;

/// Execute the languages pass against the store at `store_path`.
pub fn execute(client: &dyn Fetch, store_path: &Path) -> Result<PassReport> {
    with_store(store_path, |store| Ok(enrich(client, store)))
}

pub fn enrich(client: &dyn Fetch, store: &mut RecordStore) -> PassReport {
    let mut report = PassReport::new(PassName::Languages);

    for (full_name, record) in store.iter_mut() {
        report.visited += 1;
        let target = sub_resource_url(&api_url(full_name, &record.api_url), "languages");

        match client
            .fetch(&target)
            .and_then(|response| response.parse::<BTreeMap<String, u64>>())
        {
            Ok(languages) => {
                record.languages = Some(languages);
                report.updated += 1;
            }
            Err(skip) => {
                debug!("no languages for {full_name}: {skip}");
                report.skipped += 1;
            }
        }
    }

    report
}

/// The record's API URL, or the conventional path if it was never recorded.
pub(crate) fn api_url(full_name: &str, recorded: &str) -> String {
    if recorded.is_empty() {
        format!("repos/{full_name}")
    } else {
        recorded.to_string()
    }
}
