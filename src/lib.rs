// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod dedup;
pub mod record;
pub mod report;
pub mod sources;
pub mod store;
pub mod tracker;

// ---- Re-exports for stable public API ----
pub use crate::config::{CompanyProfile, TrackerConfig};
pub use crate::record::{Source, UpdateRecord};
pub use crate::report::RunReport;
pub use crate::store::{RecordStore, Snapshot, StoredEntry};
pub use crate::tracker::Tracker;
