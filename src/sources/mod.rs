// src/sources/mod.rs
pub mod github;
pub mod huggingface;
pub mod rss;

use anyhow::{Context, Result};
use std::fmt;
use std::time::Duration;

use crate::config::TrackerConfig;
use crate::record::{Source, UpdateRecord};

pub use github::{normalize_github, GithubRelease, HttpReleaseSource};
pub use huggingface::{normalize_huggingface, HttpModelHub, HubModel};
pub use rss::{normalize_rss, FeedEntry, HttpFeedSource};

/// GitHub-style release listing.
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Most recent releases of `endpoint`, newest first, at most `limit`.
    async fn latest_releases(&self, endpoint: &str, limit: usize) -> Result<Vec<GithubRelease>>;
}

/// RSS / Atom retrieval and parsing.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Feed entries in document order.
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>>;
}

/// Model-hub keyword search.
#[async_trait::async_trait]
pub trait ModelHub: Send + Sync {
    /// Models matching `keyword`, last-modified descending, at most `limit`.
    async fn search_models(&self, keyword: &str, limit: usize) -> Result<Vec<HubModel>>;
}

/// A single source query that produced nothing because it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: Source,
    pub company: String,
    /// Feed URL, endpoint or search keyword.
    pub target: String,
    pub reason: String,
}

impl SourceFailure {
    pub fn new(source: Source, company: &str, target: &str, err: &anyhow::Error) -> Self {
        Self {
            source,
            company: company.to_string(),
            target: target.to_string(),
            reason: format!("{err:#}"),
        }
    }
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.source, self.company, self.target, self.reason
        )
    }
}

/// Result of one source stage: what it added to the run, and what failed.
#[derive(Debug, Default, Clone)]
pub struct StageOutcome {
    pub accepted: Vec<UpdateRecord>,
    pub failures: Vec<SourceFailure>,
}

impl StageOutcome {
    pub(crate) fn fail(&mut self, failure: SourceFailure) {
        tracing::warn!(
            source = %failure.source,
            company = %failure.company,
            target = %failure.target,
            error = %failure.reason,
            "source query failed"
        );
        self.failures.push(failure);
    }
}

/// One client for every outbound request, with the configured timeout and User-Agent.
pub fn build_http_client(cfg: &TrackerConfig) -> Result<reqwest::Client> {
    let timeout = Duration::from_secs(cfg.request_timeout_secs.max(1));
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(timeout.min(Duration::from_secs(4)))
        .timeout(timeout)
        .build()
        .context("building http client")
}

/// Live HTTP-backed collaborators sharing one client.
pub struct HttpSources {
    pub releases: HttpReleaseSource,
    pub feeds: HttpFeedSource,
    pub hub: HttpModelHub,
}

impl HttpSources {
    pub fn from_config(cfg: &TrackerConfig) -> Result<Self> {
        let client = build_http_client(cfg)?;
        Ok(Self {
            releases: HttpReleaseSource::new(client.clone()),
            feeds: HttpFeedSource::new(client.clone()),
            hub: HttpModelHub::new(client),
        })
    }
}
