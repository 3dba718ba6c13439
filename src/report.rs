// src/report.rs
use chrono::NaiveDate;
use std::fmt;

use crate::record::{Source, UpdateRecord};
use crate::sources::SourceFailure;

/// What one run did. Printed by the binary, inspected by tests.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub date: NaiveDate,
    /// Records appended to the store, in acceptance order.
    pub new_records: Vec<UpdateRecord>,
    pub failures: Vec<SourceFailure>,
    /// Candidates dropped because the store (or this run) already had them.
    pub duplicates: usize,
    /// Whether the store file was rewritten.
    pub saved: bool,
}

impl RunReport {
    pub fn count_by_source(&self, source: Source) -> usize {
        self.new_records
            .iter()
            .filter(|r| r.source == source)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.new_records.is_empty() {
            writeln!(
                f,
                "No new model releases from tracked companies on {}",
                self.date
            )?;
        } else {
            writeln!(
                f,
                "{} new model release(s) on {}:",
                self.new_records.len(),
                self.date
            )?;
            for r in &self.new_records {
                writeln!(f, "  - {}: {} (source: {})", r.company, r.model_name, r.source)?;
            }
        }
        if self.has_failures() {
            writeln!(f, "{} source quer(ies) failed:", self.failures.len())?;
            for fail in &self.failures {
                writeln!(f, "  ! {fail}")?;
            }
        }
        Ok(())
    }
}
