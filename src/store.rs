//! # Repository Record Store
//!
//! The catalog is a single JSON document, `repo_info.json`, mapping each
//! repository's `full_name` to its accumulated record. Every pass loads the
//! whole document, mutates it in memory and rewrites it in full.
//!
//! Writes go to `<path>.tmp` first and are renamed into place, so a crash in
//! the middle of a pass leaves the previous snapshot intact.
//!
//! Merging is non-destructive: discovery refreshes only the whitelisted
//! fields of an existing record, and each enrichment pass only touches the
//! field it owns. Keys this crate does not know about are carried through
//! [`RepositoryRecord::extra`] untouched.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, Error, Result};

/// File name of the catalog snapshot inside the working directory.
pub const STORE_FILE_NAME: &str = "repo_info.json";

/// Whitelisted projection of an upstream repository object.
///
/// Only these fields are ever copied from the discovery sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "url")]
    pub api_url: String,
    pub html_url: String,
    pub updated_at: String,
}

/// One repository's accumulated metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "url", default)]
    pub api_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<BTreeMap<String, u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g0vjson_filename: Option<String>,
    /// Fields written by something other than this crate.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RepositoryRecord {
    /// Build a fresh record holding only the whitelisted fields.
    pub fn from_summary(summary: &RepoSummary) -> Self {
        let mut record = Self::default();
        record.apply_summary(summary);
        record
    }

    /// Overwrite the whitelisted fields, leaving everything else alone.
    pub fn apply_summary(&mut self, summary: &RepoSummary) {
        self.name = summary.name.clone();
        self.description = summary.description.clone();
        self.api_url = summary.api_url.clone();
        self.html_url = summary.html_url.clone();
        self.updated_at = summary.updated_at.clone();
    }
}

/// Ordered mapping from `full_name` to record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: BTreeMap<String, RepositoryRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store at `path`.
    ///
    /// Returns an empty store if the file does not yet exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let records = serde_json::from_str(&contents).map_err(|e| Error::Store {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { records })
    }

    /// Rewrite the whole store at `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        let json = self.to_json()?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
        Ok(())
    }

    /// Serialize with keys sorted at every level and non-ASCII left as is.
    pub fn to_json(&self) -> Result<String> {
        // Going through `Value` sorts struct fields together with `extra`.
        let value = serde_json::to_value(&self.records)?;
        let mut json = serde_json::to_string_pretty(&value)?;
        json.push('\n');
        Ok(json)
    }

    /// Insert a new record or refresh the whitelisted fields of an existing one.
    ///
    /// Returns `true` if the record was not present before.
    pub fn upsert_summary(&mut self, summary: &RepoSummary) -> bool {
        match self.records.get_mut(&summary.full_name) {
            Some(record) => {
                record.apply_summary(summary);
                false
            }
            None => {
                self.records.insert(
                    summary.full_name.clone(),
                    RepositoryRecord::from_summary(summary),
                );
                true
            }
        }
    }

    /// Insert a record only if its key is absent. Existing records are never touched.
    pub fn insert_if_absent(&mut self, summary: &RepoSummary) -> bool {
        if self.records.contains_key(&summary.full_name) {
            return false;
        }
        self.records.insert(
            summary.full_name.clone(),
            RepositoryRecord::from_summary(summary),
        );
        true
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.records.contains_key(full_name)
    }

    pub fn get(&self, full_name: &str) -> Option<&RepositoryRecord> {
        self.records.get(full_name)
    }

    pub fn get_mut(&mut self, full_name: &str) -> Option<&mut RepositoryRecord> {
        self.records.get_mut(full_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RepositoryRecord)> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut RepositoryRecord)> {
        self.records.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn summary(full_name: &str) -> RepoSummary {
    let name = full_name.rsplit('/').next().unwrap_or(full_name);
    RepoSummary {
        full_name: full_name.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} description")),
        api_url: format!("https://api.github.com/repos/{full_name}"),
        html_url: format!("https://github.com/{full_name}"),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_store_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::load(&tmp.path().join(STORE_FILE_NAME)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn save_then_load_keeps_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(STORE_FILE_NAME);

        let mut store = RecordStore::new();
        store.upsert_summary(&summary("g0v/moedict"));
        store.get_mut("g0v/moedict").unwrap().languages =
            Some(BTreeMap::from([("JavaScript".to_string(), 4096)]));
        store.save(&path).unwrap();

        let loaded = RecordStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn tmp_file_cleaned_up_after_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(STORE_FILE_NAME);
        RecordStore::new().save(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn serialized_keys_are_sorted() {
        let mut store = RecordStore::new();
        store.upsert_summary(&summary("g0v/b"));
        store.upsert_summary(&summary("g0v/a"));
        store.get_mut("g0v/a").unwrap().readme_filename = Some("g0v`a`README.md".to_string());

        let json = store.to_json().unwrap();
        assert!(json.find("\"g0v/a\"").unwrap() < json.find("\"g0v/b\"").unwrap());

        let record_a = &json[json.find("\"g0v/a\"").unwrap()..json.find("\"g0v/b\"").unwrap()];
        let keys = [
            "\"description\"",
            "\"html_url\"",
            "\"name\"",
            "\"readme_filename\"",
            "\"updated_at\"",
            "\"url\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| record_a.find(k).unwrap()).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let mut store = RecordStore::new();
        let mut s = summary("g0v/moedict");
        s.description = Some("萌典".to_string());
        store.upsert_summary(&s);
        assert!(store.to_json().unwrap().contains("萌典"));
    }

    #[test]
    fn upsert_preserves_enrichment_fields() {
        let mut store = RecordStore::new();
        assert!(store.upsert_summary(&summary("orgA/x")));
        {
            let record = store.get_mut("orgA/x").unwrap();
            record.languages = Some(BTreeMap::from([("Go".to_string(), 100)]));
            record.g0vjson_filename = Some("orgA`x`g0v.json".to_string());
        }

        let mut refreshed = summary("orgA/x");
        refreshed.updated_at = "2025-06-01T00:00:00Z".to_string();
        assert!(!store.upsert_summary(&refreshed));

        let record = store.get("orgA/x").unwrap();
        assert_eq!(record.updated_at, "2025-06-01T00:00:00Z");
        assert_eq!(
            record.languages,
            Some(BTreeMap::from([("Go".to_string(), 100)]))
        );
        assert_eq!(record.g0vjson_filename.as_deref(), Some("orgA`x`g0v.json"));
    }

    #[test]
    fn insert_if_absent_never_overwrites() {
        let mut store = RecordStore::new();
        store.upsert_summary(&summary("orgA/x"));

        let mut changed = summary("orgA/x");
        changed.description = Some("something else".to_string());
        assert!(!store.insert_if_absent(&changed));
        assert_eq!(
            store.get("orgA/x").unwrap().description.as_deref(),
            Some("x description")
        );

        assert!(store.insert_if_absent(&summary("otherOrg/z")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(STORE_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"g0v/a":{"name":"a","description":null,"url":"u","html_url":"h","updated_at":"t","stars":7}}"#,
        )
        .unwrap();

        let store = RecordStore::load(&path).unwrap();
        let record = store.get("g0v/a").unwrap();
        assert_eq!(record.description, None);
        assert_eq!(record.extra.get("stars"), Some(&serde_json::json!(7)));

        store.save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"stars\": 7"));
        assert!(written.contains("\"description\": null"));
    }

    #[test]
    fn malformed_store_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(STORE_FILE_NAME);
        std::fs::write(&path, "[1, 2").unwrap();
        let err = RecordStore::load(&path).unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
    }
}
