// src/store.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::dedup::Identity;
use crate::record::{UpdateRecord, DATE_FORMAT};

/// One element of the store array, kept exactly as it was read.
///
/// Entries that do not deserialize as an `UpdateRecord` (a missing or unknown
/// `source`, extra keys, odd types) still take part in dedup through whatever
/// string fields they carry, and are written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredEntry(Value);

impl StoredEntry {
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// The typed record, when the entry is a well-formed one.
    pub fn record(&self) -> Option<UpdateRecord> {
        UpdateRecord::deserialize(&self.0).ok()
    }

    pub fn update_date(&self) -> &str {
        self.text("update_date")
    }

    fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.update_date(), DATE_FORMAT).ok()
    }

    fn text(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

impl Identity for StoredEntry {
    fn company(&self) -> &str {
        self.text("company")
    }

    fn model_name(&self) -> &str {
        self.text("model_name")
    }

    fn link(&self) -> &str {
        self.text("link")
    }
}

impl From<UpdateRecord> for StoredEntry {
    fn from(r: UpdateRecord) -> Self {
        Self(json!({
            "company": r.company,
            "model_name": r.model_name,
            "update_date": r.update_date,
            "features": r.features,
            "source": r.source.as_str(),
            "link": r.link,
        }))
    }
}

/// Contents of the store at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<StoredEntry>,
}

impl Snapshot {
    pub fn entries(&self) -> &[StoredEntry] {
        &self.entries
    }

    /// Entries that read as typed records, in store order.
    pub fn records(&self) -> Vec<UpdateRecord> {
        self.entries.iter().filter_map(StoredEntry::record).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<StoredEntry> {
        self.entries
    }
}

/// JSON file holding every record ever accepted, newest first.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the store. A missing file, or one that is not a JSON array, counts
    /// as empty history. Individual entries are never dropped.
    pub async fn load(&self) -> Snapshot {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) => {
                tracing::info!(path = %self.path.display(), "no existing store ({e}), starting fresh");
                return Snapshot::default();
            }
        };
        if raw.trim().is_empty() {
            return Snapshot::default();
        }
        let entries = match serde_json::from_str::<Vec<StoredEntry>>(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "store is not a JSON array, treating as empty");
                return Snapshot::default();
            }
        };
        let odd = entries.iter().filter(|e| e.record().is_none()).count();
        if odd > 0 {
            tracing::warn!(path = %self.path.display(), entries = odd, "store entries not in record shape, keeping them as-is");
        }
        Snapshot { entries }
    }

    /// Rewrite the whole store, sorted by `update_date` descending.
    ///
    /// The payload goes to a sibling temp file first and is then renamed
    /// over the store.
    pub async fn save<I, E>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<StoredEntry>,
    {
        let mut entries: Vec<StoredEntry> = entries.into_iter().map(Into::into).collect();
        sort_newest_first(&mut entries);

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating store dir {}", dir.display()))?;
        }

        let body = encode_pretty(&entries)?;

        let tmp = self.tmp_path();
        fs::write(&tmp, &body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing store {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), records = entries.len(), "store saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Four-space indented JSON. serde_json writes UTF-8 as-is, so non-ASCII
/// names survive without \u escapes.
fn encode_pretty(entries: &[StoredEntry]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(entries.len() * 256);
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    entries.serialize(&mut ser).context("serializing store")?;
    buf.push(b'\n');
    Ok(buf)
}

/// Stable sort, newest date first. Entries with an unparsable or missing date go last.
pub fn sort_newest_first(entries: &mut [StoredEntry]) {
    entries.sort_by_key(|e| Reverse(e.date()));
}
