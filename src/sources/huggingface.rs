// src/sources/huggingface.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::ModelHub;
use crate::record::{date_from_timestamp, format_date, Source, UpdateRecord};

pub const HUB_API_URL: &str = "https://huggingface.co/api/models";
pub const HUB_MODEL_URL: &str = "https://huggingface.co";
pub const FEATURE_TAGS: usize = 5;

/// A model descriptor returned by a hub search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubModel {
    pub id: String,
    pub last_modified: Option<String>,
    pub tags: Vec<String>,
}

// The REST API sends both `id` and `modelId`; either may be the only one present.
#[derive(Debug, Deserialize)]
struct WireModel {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "modelId")]
    model_id: Option<String>,
    #[serde(default, rename = "lastModified")]
    last_modified: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl From<WireModel> for HubModel {
    fn from(w: WireModel) -> Self {
        Self {
            id: w.id.or(w.model_id).unwrap_or_default(),
            last_modified: w.last_modified,
            tags: w.tags.unwrap_or_default(),
        }
    }
}

pub fn model_link(id: &str) -> String {
    format!("{HUB_MODEL_URL}/{id}")
}

/// Turn a hub model into a record. A missing last-modified stamp counts as `today`.
pub fn normalize_huggingface(
    model: &HubModel,
    company: &str,
    today: NaiveDate,
) -> Option<UpdateRecord> {
    if model.id.trim().is_empty() {
        tracing::debug!(company, "hub model without identifier");
        return None;
    }
    let date = match model.last_modified.as_deref() {
        Some(ts) => match date_from_timestamp(ts) {
            Some(d) => d,
            None => {
                tracing::debug!(company, model = %model.id, ts, "unparsable lastModified");
                return None;
            }
        },
        None => today,
    };

    let features = if model.tags.is_empty() {
        String::new()
    } else {
        let head: Vec<&str> = model
            .tags
            .iter()
            .take(FEATURE_TAGS)
            .map(String::as_str)
            .collect();
        format!("Tags: {}", head.join(", "))
    };

    Some(UpdateRecord {
        company: company.to_string(),
        model_name: model.id.clone(),
        update_date: format_date(date),
        features,
        source: Source::HuggingFace,
        link: model_link(&model.id),
    })
}

/// Hugging Face Hub REST search.
pub struct HttpModelHub {
    client: reqwest::Client,
}

impl HttpModelHub {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelHub for HttpModelHub {
    async fn search_models(&self, keyword: &str, limit: usize) -> Result<Vec<HubModel>> {
        let limit = limit.to_string();
        let resp = self
            .client
            .get(HUB_API_URL)
            .query(&[
                ("search", keyword),
                ("sort", "lastModified"),
                ("direction", "-1"),
                ("limit", limit.as_str()),
                ("full", "true"),
            ])
            .send()
            .await
            .context("hub search get()")?
            .error_for_status()
            .context("hub search non-2xx")?;
        let models: Vec<WireModel> = resp.json().await.context("parsing hub search json")?;
        Ok(models.into_iter().map(HubModel::from).collect())
    }
}
