// src/config/companies.rs
use serde::{Deserialize, Serialize};

/// Static per-company configuration: what to search for and where.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyProfile {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// GitHub `releases` API URLs.
    #[serde(default)]
    pub api_endpoints: Vec<String>,
    /// Official RSS / Atom feed URLs.
    #[serde(default)]
    pub rss_feeds: Vec<String>,
}

impl CompanyProfile {
    pub fn new(name: &str, keywords: &[&str], api_endpoints: &[&str], rss_feeds: &[&str]) -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            name: name.to_string(),
            keywords: owned(keywords),
            api_endpoints: owned(api_endpoints),
            rss_feeds: owned(rss_feeds),
        }
    }

    /// Trim entries, drop blanks and repeated keywords (first occurrence wins).
    pub(crate) fn cleaned(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.keywords = clean_list(self.keywords, true);
        self.api_endpoints = clean_list(self.api_endpoints, false);
        self.rss_feeds = clean_list(self.rss_feeds, false);
        self
    }
}

fn clean_list(items: Vec<String>, case_insensitive: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if t.is_empty() {
            continue;
        }
        let dup = out.iter().any(|o| {
            if case_insensitive {
                o.to_lowercase() == t.to_lowercase()
            } else {
                o == t
            }
        });
        if !dup {
            out.push(t.to_string());
        }
    }
    out
}

/// The companies tracked when no config file is present.
pub fn builtin_companies() -> Vec<CompanyProfile> {
    vec![
        CompanyProfile::new(
            "OpenAI",
            &["gpt", "chatgpt", "o1", "o3", "davinci", "curie", "babbage", "ada"],
            &["https://api.github.com/repos/openai/openai-python/releases"],
            &["https://openai.com/blog/rss.xml"],
        ),
        CompanyProfile::new(
            "Anthropic",
            &["claude", "sonnet", "opus", "haiku"],
            &["https://api.github.com/repos/anthropics/anthropic-sdk-python/releases"],
            &["https://www.anthropic.com/news.rss"],
        ),
        CompanyProfile::new(
            "Google",
            &["gemini", "bard", "palm", "lamda", "pathways"],
            &["https://api.github.com/repos/google/generative-ai-python/releases"],
            &["https://blog.google/technology/ai/rss/"],
        ),
        CompanyProfile::new(
            "Meta",
            &["llama", "code llama", "purple llama"],
            &["https://api.github.com/repos/facebookresearch/llama/releases"],
            &["https://ai.meta.com/blog/rss/"],
        ),
        CompanyProfile::new("xAI", &["grok"], &[], &[]),
        CompanyProfile::new(
            "DeepSeek",
            &["deepseek"],
            &["https://api.github.com/repos/deepseek-ai/DeepSeek-LLM/releases"],
            &[],
        ),
        CompanyProfile::new(
            "Alibaba",
            &["qwen", "通义", "tongyi"],
            &["https://api.github.com/repos/QwenLM/Qwen/releases"],
            &[],
        ),
        CompanyProfile::new("Moonshot", &["kimi", "moonshot"], &[], &[]),
        CompanyProfile::new("ByteDance", &["doubao", "豆包", "bytedance"], &[], &[]),
    ]
}
