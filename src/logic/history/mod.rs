//! History Module - per-subject durable logs and summaries
//!
//! Appends labeled samples to `<subject_id>_history.csv` files and rolls them
//! up into per-subject and combined summaries.
//!
//! # Architecture
//! - `record.rs`: `HistoryRecord`, CSV row layout, legacy parsing
//! - `writer.rs`: `HistoryStore`, serialized appends
//! - `summary.rs`: `SubjectSummary`, `summarize`, `summarize_all`
//! - `export.rs`: merge all logs into one CSV
//!
//! # Failure Strategy
//! IO and parse failures are returned to the caller. A missing `anomaly`
//! column is not a failure: those rows count as Normal.

pub mod export;
pub mod record;
pub mod summary;
pub mod writer;


pub use record::{HistoryRecord, HistoryRow, HISTORY_COLUMNS};
pub use summary::SubjectSummary;
pub use writer::{validate_log_name, validate_subject_id, HistoryStore};
