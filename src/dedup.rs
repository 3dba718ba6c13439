// src/dedup.rs
//! Date filter and uniqueness rules shared by every source stage.

use chrono::NaiveDate;

use crate::record::{UpdateRecord, DATE_FORMAT};

/// True when `date_str` is a valid `YYYY-MM-DD` equal to `today`.
/// Anything unparsable is simply "not today".
pub fn is_today(date_str: &str, today: NaiveDate) -> bool {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map(|d| d == today)
        .unwrap_or(false)
}

/// The fields uniqueness is judged on.
pub trait Identity {
    fn company(&self) -> &str;
    fn model_name(&self) -> &str;
    fn link(&self) -> &str;
}

impl Identity for UpdateRecord {
    fn company(&self) -> &str {
        &self.company
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn link(&self) -> &str {
        &self.link
    }
}

/// A candidate is a duplicate if any pooled entry shares its non-empty link,
/// or shares both company and model name.
pub fn is_duplicate<'a, T, I>(candidate: &UpdateRecord, pool: I) -> bool
where
    T: Identity + 'a,
    I: IntoIterator<Item = &'a T>,
{
    pool.into_iter().any(|r| {
        (!candidate.link.is_empty() && r.link() == candidate.link)
            || (r.company() == candidate.company && r.model_name() == candidate.model_name)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Key {
    company: String,
    model_name: String,
    link: String,
}

impl Identity for Key {
    fn company(&self) -> &str {
        &self.company
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn link(&self) -> &str {
        &self.link
    }
}

impl Key {
    fn of<T: Identity + ?Sized>(r: &T) -> Self {
        Self {
            company: r.company().to_string(),
            model_name: r.model_name().to_string(),
            link: r.link().to_string(),
        }
    }
}

/// The dedup pool of one run: identities of the loaded store plus everything
/// accepted so far. Accepted records themselves stay with the caller.
#[derive(Debug, Default)]
pub struct RunBatch {
    seen: Vec<Key>,
    accepted: usize,
    duplicates: usize,
}

impl RunBatch {
    pub fn new<'a, T, I>(existing: I) -> Self
    where
        T: Identity + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        Self {
            seen: existing.into_iter().map(Key::of).collect(),
            ..Self::default()
        }
    }

    pub fn contains(&self, candidate: &UpdateRecord) -> bool {
        is_duplicate(candidate, &self.seen)
    }

    /// Accept `candidate` unless it duplicates the pool. Returns whether it was accepted.
    pub fn offer(&mut self, candidate: &UpdateRecord) -> bool {
        if self.contains(candidate) {
            self.duplicates += 1;
            tracing::debug!(
                company = %candidate.company,
                model = %candidate.model_name,
                link = %candidate.link,
                "duplicate candidate dropped"
            );
            return false;
        }
        self.seen.push(Key::of(candidate));
        self.accepted += 1;
        true
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
