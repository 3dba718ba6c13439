// src/sources/github.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::ReleaseSource;
use crate::record::{date_from_timestamp, format_date, truncate_chars, Source, UpdateRecord};

pub const FEATURES_MAX_CHARS: usize = 500;

/// Subset of a GitHub `releases` API item.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GithubRelease {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

// Leading version number: optional `v`, any `<digits>.` groups, then digits.
// Greedy on purpose: "4o" loses its "4" too.
static RE_VERSION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v?(\d+\.)*\d+").expect("version prefix regex"));

/// Strip a leading version number from a tag, then trim dashes and whitespace.
pub fn strip_version_prefix(tag: &str) -> String {
    let rest = RE_VERSION_PREFIX.replace(tag, "");
    rest.trim_matches('-').trim().to_string()
}

/// Turn one release into a record. `None` when the publish date is missing
/// or unparsable.
pub fn normalize_github(release: &GithubRelease, company: &str) -> Option<UpdateRecord> {
    let Some(published) = release.published_at.as_deref() else {
        tracing::debug!(company, tag = ?release.tag_name, "release without published_at");
        return None;
    };
    let Some(date) = date_from_timestamp(published) else {
        tracing::debug!(company, published, "unparsable release date");
        return None;
    };

    let tag = release
        .tag_name
        .as_deref()
        .or(release.name.as_deref())
        .unwrap_or("Unknown");
    let mut model_name = strip_version_prefix(tag);
    if model_name.is_empty() {
        model_name = format!(
            "{company} Model {}",
            release.tag_name.as_deref().unwrap_or("Unknown")
        );
    }

    Some(UpdateRecord {
        company: company.to_string(),
        model_name,
        update_date: format_date(date),
        features: truncate_chars(release.body.as_deref().unwrap_or_default(), FEATURES_MAX_CHARS),
        source: Source::GitHub,
        link: release.html_url.clone().unwrap_or_default(),
    })
}

/// Releases fetched from the GitHub REST API.
pub struct HttpReleaseSource {
    client: reqwest::Client,
}

impl HttpReleaseSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReleaseSource for HttpReleaseSource {
    async fn latest_releases(&self, endpoint: &str, limit: usize) -> Result<Vec<GithubRelease>> {
        let resp = self
            .client
            .get(endpoint)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .context("github get()")?
            .error_for_status()
            .context("github non-2xx")?;
        let mut releases: Vec<GithubRelease> =
            resp.json().await.context("parsing github releases json")?;
        releases.truncate(limit);
        Ok(releases)
    }
}
