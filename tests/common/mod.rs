// tests/common/mod.rs
// In-memory stand-ins for the GitHub / feed / hub collaborators.
#![allow(dead_code)]

use anyhow::{bail, Result};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use model_release_tracker::sources::rss::parse_feed;
use model_release_tracker::sources::{
    FeedEntry, FeedSource, GithubRelease, HubModel, ModelHub, ReleaseSource,
};
use model_release_tracker::{CompanyProfile, Source, Tracker, TrackerConfig, UpdateRecord};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
}

#[derive(Default)]
pub struct StubReleases {
    pub by_endpoint: HashMap<String, Vec<GithubRelease>>,
    pub failing: HashSet<String>,
}

impl StubReleases {
    pub fn with(mut self, endpoint: &str, releases: Vec<GithubRelease>) -> Self {
        self.by_endpoint.insert(endpoint.to_string(), releases);
        self
    }

    pub fn failing(mut self, endpoint: &str) -> Self {
        self.failing.insert(endpoint.to_string());
        self
    }
}

#[async_trait::async_trait]
impl ReleaseSource for StubReleases {
    async fn latest_releases(&self, endpoint: &str, limit: usize) -> Result<Vec<GithubRelease>> {
        if self.failing.contains(endpoint) {
            bail!("connection refused");
        }
        Ok(self
            .by_endpoint
            .get(endpoint)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }
}

#[derive(Default)]
pub struct StubFeeds {
    pub by_url: HashMap<String, Vec<FeedEntry>>,
    pub failing: HashSet<String>,
}

impl StubFeeds {
    pub fn with(mut self, url: &str, entries: Vec<FeedEntry>) -> Self {
        self.by_url.insert(url.to_string(), entries);
        self
    }

    /// Parse an XML fixture the same way the HTTP source does.
    pub fn with_xml(self, url: &str, xml: &str) -> Self {
        let entries = parse_feed(xml).expect("fixture parses");
        self.with(url, entries)
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }
}

#[async_trait::async_trait]
impl FeedSource for StubFeeds {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>> {
        if self.failing.contains(url) {
            bail!("feed timed out");
        }
        Ok(self.by_url.get(url).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct StubHub {
    pub by_keyword: HashMap<String, Vec<HubModel>>,
    pub failing: HashSet<String>,
    pub searched: Mutex<Vec<String>>,
}

impl StubHub {
    pub fn with(mut self, keyword: &str, models: Vec<HubModel>) -> Self {
        self.by_keyword.insert(keyword.to_string(), models);
        self
    }

    pub fn failing(mut self, keyword: &str) -> Self {
        self.failing.insert(keyword.to_string());
        self
    }
}

#[async_trait::async_trait]
impl ModelHub for StubHub {
    async fn search_models(&self, keyword: &str, limit: usize) -> Result<Vec<HubModel>> {
        self.searched.lock().unwrap().push(keyword.to_string());
        if self.failing.contains(keyword) {
            bail!("hub returned 503");
        }
        Ok(self
            .by_keyword
            .get(keyword)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }
}

pub fn company(name: &str, keywords: &[&str], endpoints: &[&str], feeds: &[&str]) -> CompanyProfile {
    CompanyProfile::new(name, keywords, endpoints, feeds)
}

pub fn tracker(
    store_path: &Path,
    companies: Vec<CompanyProfile>,
    releases: StubReleases,
    feeds: StubFeeds,
    hub: StubHub,
) -> Tracker {
    let mut cfg = TrackerConfig::with_companies(companies);
    cfg.store_path = store_path.to_path_buf();
    Tracker::new(cfg, Box::new(releases), Box::new(feeds), Box::new(hub))
}

pub fn release(tag: &str, published_at: &str, url: &str) -> GithubRelease {
    GithubRelease {
        tag_name: Some(tag.to_string()),
        name: None,
        published_at: Some(published_at.to_string()),
        body: Some(format!("Release notes for {tag}")),
        html_url: Some(url.to_string()),
    }
}

pub fn hub_model(id: &str, last_modified: Option<&str>) -> HubModel {
    HubModel {
        id: id.to_string(),
        last_modified: last_modified.map(str::to_string),
        tags: vec!["text-generation".into(), "safetensors".into()],
    }
}

pub fn record(company: &str, name: &str, date: &str, source: Source, link: &str) -> UpdateRecord {
    UpdateRecord {
        company: company.to_string(),
        model_name: name.to_string(),
        update_date: date.to_string(),
        features: String::new(),
        source,
        link: link.to_string(),
    }
}

/// No two records share a non-empty link, nor a (company, model_name) pair.
pub fn assert_unique(records: &[UpdateRecord]) {
    for (i, a) in records.iter().enumerate() {
        for b in &records[i + 1..] {
            assert!(
                a.link.is_empty() || a.link != b.link,
                "duplicate link {}",
                a.link
            );
            assert!(
                !(a.company == b.company && a.model_name == b.model_name),
                "duplicate {}/{}",
                a.company,
                a.model_name
            );
        }
    }
}

/// Adjacent records are in non-increasing date order.
pub fn assert_sorted_desc(records: &[UpdateRecord]) {
    for w in records.windows(2) {
        assert!(
            w[0].update_date >= w[1].update_date,
            "{} before {}",
            w[0].update_date,
            w[1].update_date
        );
    }
}
