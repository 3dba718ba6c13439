// src/sources/rss.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime,
};

use super::FeedSource;
use crate::config::CompanyProfile;
use crate::record::{format_date, truncate_chars, Source, UpdateRecord};

pub const FEATURES_MAX_CHARS: usize = 300;

/// Words in a title that mark an entry as a release announcement.
pub const RELEASE_WORDS: [&str; 7] = [
    "release",
    "launch",
    "announce",
    "unveil",
    "introduce",
    "available",
    "new",
];

/// One feed item, format-independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    /// Plain text: entities decoded, tags stripped.
    pub summary: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

// ---- RSS 2.0 ----

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

// ---- Atom ----

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    summary: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn alternate_link(&self) -> String {
        self.links
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .or_else(|| self.links.first())
            .map(|l| l.href.clone())
            .unwrap_or_default()
    }
}

/// Feed timestamp to UTC. RFC 2822 (RSS) or RFC 3339 (Atom).
pub fn parse_feed_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    let unix = OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .map(|dt| dt.unix_timestamp())
        .ok();
    match unix {
        Some(secs) => DateTime::from_timestamp(secs, 0),
        // chrono is more lenient with obsolete zone names ("EST", "GMT")
        None => DateTime::parse_from_rfc2822(ts)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Entity-decode, drop tags, collapse whitespace.
pub fn clean_summary(s: &str) -> String {
    let out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let out = re_tags.replace_all(&out, "");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

/// Local name of the document's root element.
fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

/// Parse an RSS 2.0 or Atom document into entries, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let xml = scrub_html_entities_for_xml(xml);

    match root_element(&xml).as_deref() {
        Some("rss") => {
            let rss: Rss = from_str(&xml).context("parsing rss xml")?;
            Ok(rss
                .channel
                .item
                .into_iter()
                .map(|it| FeedEntry {
                    title: it.title.unwrap_or_default().trim().to_string(),
                    summary: clean_summary(it.description.as_deref().unwrap_or_default()),
                    link: it.link.unwrap_or_default().trim().to_string(),
                    published: it.pub_date.as_deref().and_then(parse_feed_timestamp),
                })
                .collect())
        }
        Some("feed") => {
            let feed: AtomFeed = from_str(&xml).context("parsing atom xml")?;
            Ok(feed
                .entry
                .into_iter()
                .map(|e| FeedEntry {
                    link: e.alternate_link(),
                    title: e.title.map(|t| t.value).unwrap_or_default().trim().to_string(),
                    summary: clean_summary(&e.summary.map(|t| t.value).unwrap_or_default()),
                    published: e.published.as_deref().and_then(parse_feed_timestamp),
                })
                .collect())
        }
        Some(other) => Err(anyhow!("unsupported feed root <{other}>")),
        None => Err(anyhow!("empty or malformed xml document")),
    }
}

/// True if any company keyword appears in the title or summary (case-insensitive).
pub fn mentions_company(entry: &FeedEntry, profile: &CompanyProfile) -> bool {
    let title = entry.title.to_lowercase();
    let summary = entry.summary.to_lowercase();
    profile.keywords.iter().any(|k| {
        let k = k.to_lowercase();
        title.contains(&k) || summary.contains(&k)
    })
}

/// True if the title reads like a release announcement.
pub fn is_release_title(title: &str) -> bool {
    let title = title.to_lowercase();
    RELEASE_WORDS.iter().any(|w| title.contains(*w))
}

/// Accept an entry only if it mentions the company, announces a release and
/// was published `today` (entries without a date count as today).
pub fn normalize_rss(
    entry: &FeedEntry,
    profile: &CompanyProfile,
    today: NaiveDate,
) -> Option<UpdateRecord> {
    if !mentions_company(entry, profile) || !is_release_title(&entry.title) {
        return None;
    }
    let date = entry.published.map(|dt| dt.date_naive()).unwrap_or(today);
    if date != today {
        return None;
    }
    Some(UpdateRecord {
        company: profile.name.clone(),
        model_name: entry.title.clone(),
        update_date: format_date(date),
        features: truncate_chars(&entry.summary, FEATURES_MAX_CHARS),
        source: Source::OfficialRss,
        link: entry.link.clone(),
    })
}

/// Feeds fetched over HTTP.
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .context("feed http get()")?
            .error_for_status()
            .context("feed non-2xx")?
            .text()
            .await
            .context("feed http .text()")?;
        parse_feed(&body).context("parsing feed xml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_summary_strips_markup() {
        let s = "<p>Meet&nbsp;<b>Claude</b> &amp; friends</p>\n\n  today";
        assert_eq!(clean_summary(s), "Meet Claude & friends today");
    }

    #[test]
    fn feed_timestamps_are_utc() {
        let dt = parse_feed_timestamp("Tue, 04 Mar 2025 23:30:00 -0500").unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        let dt = parse_feed_timestamp("2025-03-04T10:00:00Z").unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert!(parse_feed_timestamp("soon").is_none());
    }

    #[test]
    fn release_vocabulary_is_substring_match() {
        assert!(is_release_title("Google introduces Gemini 2"));
        assert!(!is_release_title("Introducing Gemini 2"));
        assert!(is_release_title("Now AVAILABLE in the API"));
        assert!(!is_release_title("Acme raises funding"));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_feed("<html><body>nope</body></html>").is_err());
    }
}
