// src/record.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used for `update_date` in the store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where a record was discovered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Source {
    #[serde(rename = "GitHub")]
    GitHub,
    #[serde(rename = "Hugging Face")]
    HuggingFace,
    #[serde(rename = "Official RSS")]
    OfficialRss,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::GitHub => "GitHub",
            Source::HuggingFace => "Hugging Face",
            Source::OfficialRss => "Official RSS",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One model release, as persisted in the store.
///
/// Fields other than `source` default when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateRecord {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub model_name: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub update_date: String,
    #[serde(default)]
    pub features: String,
    pub source: Source,
    #[serde(default)]
    pub link: String,
}

impl UpdateRecord {
    /// Parsed `update_date`, `None` when it is not a valid `YYYY-MM-DD`.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.update_date, DATE_FORMAT).ok()
    }
}

/// Format a calendar date the way the store expects it.
pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Reduce a source timestamp to its calendar date, in the offset the
/// timestamp itself carries. Accepts RFC 3339, naive ISO datetimes and bare dates.
pub fn date_from_timestamp(ts: &str) -> Option<NaiveDate> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(ts, DATE_FORMAT).ok()
}

/// Keep at most `max` characters (not bytes) of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
