//! Passes 4 and 5: README and metadata-file extraction
//!
//! Both passes fetch a base64 content envelope for every record, decode it
//! into a side-channel file next to the catalog and record that file's name.
//! They differ only in the [`ContentKind`].
//!
//! Envelopes whose `encoding` is not `base64` are treated as if the fetch had
//! failed: no file, no field.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info, warn};
use serde::Deserialize;

use super::languages::api_url;
use super::{with_store, PassName, PassReport};
use crate::client::{sub_resource_url, Fetch};
use crate::content::{content_filename, ContentKind, MARKER};
use crate::error::{io_err, Result};
use crate::store::{RecordStore, RepositoryRecord};

/// The subset of a GitHub contents response this pass reads.
#[derive(Debug, Deserialize)]
struct ContentEnvelope {
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    name: String,
}

impl From<ContentKind> for PassName {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Readme => PassName::Readme,
            ContentKind::Metadata => PassName::Metadata,
        }
    }
}

/// Execute the content pass for `kind`, writing files into `output_dir`.
pub fn execute(
    client: &dyn Fetch,
    kind: ContentKind,
    store_path: &Path,
    output_dir: &Path,
) -> Result<PassReport> {
    with_store(store_path, |store| enrich(client, kind, store, output_dir))
}

pub fn enrich(
    client: &dyn Fetch,
    kind: ContentKind,
    store: &mut RecordStore,
    output_dir: &Path,
) -> Result<PassReport> {
    let mut report = PassReport::new(kind.into());
    std::fs::create_dir_all(output_dir).map_err(|e| io_err(output_dir, e))?;

    for (full_name, record) in store.iter_mut() {
        report.visited += 1;
        let target = sub_resource_url(&api_url(full_name, &record.api_url), kind.sub_resource());

        let envelope = match client
            .fetch(&target)
            .and_then(|response| response.parse::<ContentEnvelope>())
        {
            Ok(envelope) => envelope,
            Err(skip) => {
                debug!("no {kind} for {full_name}: {skip}");
                report.skipped += 1;
                continue;
            }
        };

        let Some(text) = decode(full_name, kind, &envelope) else {
            report.skipped += 1;
            continue;
        };

        let filename = content_filename(full_name, kind, &envelope.name);
        let path = output_dir.join(&filename);
        if let Err(e) = std::fs::write(&path, text) {
            warn!("skipping {kind} of {full_name}: {}", io_err(&path, e));
            report.skipped += 1;
            continue;
        }
        info!("write {filename}");

        set_filename(record, kind, filename);
        report.updated += 1;
    }

    Ok(report)
}

fn decode(full_name: &str, kind: ContentKind, envelope: &ContentEnvelope) -> Option<String> {
    if envelope.encoding.as_deref() != Some("base64") {
        debug!(
            "skipping {kind} of {full_name}: encoding {:?}",
            envelope.encoding
        );
        return None;
    }
    if kind == ContentKind::Readme
        && (envelope.name.is_empty() || envelope.name.contains(['/', MARKER]))
    {
        warn!("skipping README of {full_name}: unusable name {:?}", envelope.name);
        return None;
    }

    // The API wraps base64 payloads at 60 columns.
    let payload: String = envelope
        .content
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = match STANDARD.decode(payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("skipping {kind} of {full_name}: invalid base64: {e}");
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("skipping {kind} of {full_name}: not UTF-8: {e}");
            None
        }
    }
}

fn set_filename(record: &mut RepositoryRecord, kind: ContentKind, filename: String) {
    match kind {
        ContentKind::Readme => record.readme_filename = Some(filename),
        ContentKind::Metadata => record.g0vjson_filename = Some(filename),
    }
}
