// src/tracker.rs
//! One fetch-filter-merge-save cycle over every tracked company.
//!
//! Stages run in a fixed order (RSS, GitHub, Hugging Face) and all share one
//! `RunBatch`, so a later stage never re-adds what an earlier one found.
//! A failing feed, endpoint or keyword search only empties its own
//! contribution; the only fatal error is failing to save the store.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::config::TrackerConfig;
use crate::dedup::{is_today, RunBatch};
use crate::record::{format_date, Source};
use crate::report::RunReport;
use crate::sources::{
    normalize_github, normalize_huggingface, normalize_rss, FeedSource, HttpSources, ModelHub,
    ReleaseSource, SourceFailure, StageOutcome,
};
use crate::store::{RecordStore, StoredEntry};

pub const RSS_ENTRIES_PER_FEED: usize = 5;
pub const GITHUB_RELEASES_PER_ENDPOINT: usize = 5;
pub const HUB_RESULTS_PER_KEYWORD: usize = 10;
/// Max Hugging Face records accepted per company per run.
pub const HUB_DAILY_CAP: usize = 2;

pub struct Tracker {
    config: TrackerConfig,
    store: RecordStore,
    releases: Box<dyn ReleaseSource>,
    feeds: Box<dyn FeedSource>,
    hub: Box<dyn ModelHub>,
}

impl Tracker {
    pub fn new(
        config: TrackerConfig,
        releases: Box<dyn ReleaseSource>,
        feeds: Box<dyn FeedSource>,
        hub: Box<dyn ModelHub>,
    ) -> Self {
        let store = RecordStore::new(config.store_path.clone());
        Self {
            config,
            store,
            releases,
            feeds,
            hub,
        }
    }

    /// Tracker wired to the live GitHub / Hugging Face / feed endpoints.
    pub fn from_config(config: TrackerConfig) -> Result<Self> {
        let http = HttpSources::from_config(&config)?;
        Ok(Self::new(
            config,
            Box::new(http.releases),
            Box::new(http.feeds),
            Box::new(http.hub),
        ))
    }

    /// Official feeds: first entries of each feed that mention the company,
    /// read like a release announcement and were published today.
    pub async fn poll_rss(&self, today: NaiveDate, batch: &mut RunBatch) -> StageOutcome {
        let mut out = StageOutcome::default();
        for profile in &self.config.companies {
            for url in &profile.rss_feeds {
                info!(company = %profile.name, feed = %url, "checking official feed");
                let entries = match self.feeds.fetch_entries(url).await {
                    Ok(v) => v,
                    Err(e) => {
                        out.fail(SourceFailure::new(Source::OfficialRss, &profile.name, url, &e));
                        continue;
                    }
                };
                for entry in entries.iter().take(RSS_ENTRIES_PER_FEED) {
                    let Some(rec) = normalize_rss(entry, profile, today) else {
                        continue;
                    };
                    if batch.offer(&rec) {
                        info!(company = %rec.company, title = %rec.model_name, "new official announcement");
                        out.accepted.push(rec);
                    }
                }
            }
        }
        out
    }

    /// GitHub releases published today.
    pub async fn poll_github(&self, today: NaiveDate, batch: &mut RunBatch) -> StageOutcome {
        let mut out = StageOutcome::default();
        for profile in &self.config.companies {
            for endpoint in &profile.api_endpoints {
                info!(company = %profile.name, endpoint = %endpoint, "checking github releases");
                let releases = match self
                    .releases
                    .latest_releases(endpoint, GITHUB_RELEASES_PER_ENDPOINT)
                    .await
                {
                    Ok(v) => v,
                    Err(e) => {
                        out.fail(SourceFailure::new(Source::GitHub, &profile.name, endpoint, &e));
                        continue;
                    }
                };
                for release in releases.iter().take(GITHUB_RELEASES_PER_ENDPOINT) {
                    let Some(rec) = normalize_github(release, &profile.name) else {
                        continue;
                    };
                    if !is_today(&rec.update_date, today) {
                        continue;
                    }
                    if batch.offer(&rec) {
                        info!(company = %rec.company, model = %rec.model_name, "new github release");
                        out.accepted.push(rec);
                    }
                }
            }
        }
        out
    }

    /// Hugging Face models touched today, searched by every company keyword,
    /// at most `HUB_DAILY_CAP` per company.
    pub async fn poll_huggingface(
        &self,
        today: NaiveDate,
        batch: &mut RunBatch,
    ) -> StageOutcome {
        let mut out = StageOutcome::default();
        for profile in &self.config.companies {
            info!(company = %profile.name, "checking hugging face");
            let mut models = Vec::new();
            for keyword in &profile.keywords {
                match self
                    .hub
                    .search_models(keyword, HUB_RESULTS_PER_KEYWORD)
                    .await
                {
                    Ok(mut v) => {
                        v.truncate(HUB_RESULTS_PER_KEYWORD);
                        models.append(&mut v);
                    }
                    Err(e) => {
                        out.fail(SourceFailure::new(Source::HuggingFace, &profile.name, keyword, &e))
                    }
                }
            }

            let mut accepted_here = 0usize;
            for model in &models {
                if accepted_here >= HUB_DAILY_CAP {
                    break;
                }
                let Some(rec) = normalize_huggingface(model, &profile.name, today) else {
                    continue;
                };
                if !is_today(&rec.update_date, today) {
                    continue;
                }
                if batch.offer(&rec) {
                    info!(company = %rec.company, model = %rec.model_name, "new hugging face model");
                    out.accepted.push(rec);
                    accepted_here += 1;
                }
            }
        }
        out
    }

    /// Load, poll every stage, save if anything new turned up.
    pub async fn run(&self, today: NaiveDate) -> Result<RunReport> {
        info!(
            date = %format_date(today),
            companies = ?self.config.company_names(),
            "fetching today's model releases"
        );

        let existing = self.store.load().await;
        let mut batch = RunBatch::new(existing.entries());

        let mut new_records = Vec::new();
        let mut failures = Vec::new();
        for (stage, outcome) in [
            ("rss", self.poll_rss(today, &mut batch).await),
            ("github", self.poll_github(today, &mut batch).await),
            ("huggingface", self.poll_huggingface(today, &mut batch).await),
        ] {
            info!(
                stage,
                accepted = outcome.accepted.len(),
                failed = outcome.failures.len(),
                "stage done"
            );
            new_records.extend(outcome.accepted);
            failures.extend(outcome.failures);
        }

        let duplicates = batch.duplicates();
        let saved = if new_records.is_empty() {
            info!("nothing new, store left untouched");
            false
        } else {
            let mut all = existing.into_entries();
            all.extend(new_records.iter().cloned().map(StoredEntry::from));
            self.store.save(all).await?;
            info!(
                added = new_records.len(),
                path = %self.store.path().display(),
                "store updated"
            );
            true
        };

        Ok(RunReport {
            date: today,
            new_records,
            failures,
            duplicates,
            saved,
        })
    }
}
