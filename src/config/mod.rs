// src/config/mod.rs
pub mod companies;

pub use companies::{builtin_companies, CompanyProfile};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "TRACKER_CONFIG_PATH";
pub const ENV_STORE_PATH: &str = "TRACKER_STORE_PATH";
pub const ENV_HTTP_TIMEOUT: &str = "TRACKER_HTTP_TIMEOUT_SECS";

const DEFAULT_TOML: &str = "config/tracker.toml";
const DEFAULT_JSON: &str = "config/tracker.json";

fn default_store_path() -> PathBuf {
    PathBuf::from("data.json")
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!(
        "model-release-tracker/{} (+https://github.com)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Immutable tracker configuration, handed to `Tracker` at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Per-request network timeout.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub companies: Vec<CompanyProfile>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TrackerConfig {
    /// Built-in company table with default store/HTTP settings.
    pub fn builtin() -> Self {
        Self {
            store_path: default_store_path(),
            request_timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            companies: builtin_companies(),
        }
    }

    /// Same defaults, custom companies. Handy for tests and embedders.
    pub fn with_companies(companies: Vec<CompanyProfile>) -> Self {
        Self {
            companies,
            ..Self::builtin()
        }
    }

    pub fn company_names(&self) -> Vec<&str> {
        self.companies.iter().map(|c| c.name.as_str()).collect()
    }

    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading tracker config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing tracker config {}", path.display()))?
            .validated()
    }

    /// Resolution order:
    /// 1) $TRACKER_CONFIG_PATH
    /// 2) config/tracker.toml
    /// 3) config/tracker.json
    /// 4) built-in table
    ///
    /// Env overrides ($TRACKER_STORE_PATH, $TRACKER_HTTP_TIMEOUT_SECS) apply on top.
    pub fn load_default() -> Result<Self> {
        let cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_TOML).exists() {
            Self::load_from(Path::new(DEFAULT_TOML))?
        } else if Path::new(DEFAULT_JSON).exists() {
            Self::load_from(Path::new(DEFAULT_JSON))?
        } else {
            Self::builtin()
        };
        cfg.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_STORE_PATH) {
            if !p.trim().is_empty() {
                self.store_path = PathBuf::from(p.trim());
            }
        }
        if let Ok(v) = std::env::var(ENV_HTTP_TIMEOUT) {
            self.request_timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_HTTP_TIMEOUT} must be a number of seconds"))?;
        }
        Ok(self)
    }

    fn validated(mut self) -> Result<Self> {
        if self.companies.is_empty() {
            self.companies = builtin_companies();
        }
        self.companies = self
            .companies
            .into_iter()
            .map(CompanyProfile::cleaned)
            .collect();
        if self.companies.iter().any(|c| c.name.is_empty()) {
            bail!("every company needs a non-empty name");
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_timeout_secs();
        }
        Ok(self)
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<TrackerConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("invalid JSON");
    }
    match toml::from_str::<TrackerConfig>(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!(toml_err))
            .context("invalid TOML"),
    }
}
