//! History Summaries
//!
//! Aggregates are recomputed from the full log on every call, so they always
//! match what is on disk. Reads are snapshots: a trailing row without its
//! newline is kept only if it parses as a full row, otherwise it is taken as
//! an append still in flight and left out.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::HISTORY_FILE_SUFFIX;
use crate::logic::error::{HealthError, HealthResult};
use super::record::HistoryRow;
use super::writer::{file_lock, validate_log_name, HistoryStore};

/// Aggregated history for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub subject_id: String,
    pub mean_heart_rate: f64,
    pub mean_blood_oxygen: f64,
    pub mean_temperature: f64,
    pub mean_respiration_rate: f64,
    pub anomaly_count: usize,
    pub record_count: usize,
}

/// Running sums for one subject
#[derive(Debug, Default)]
struct SummaryAccumulator {
    heart_rate: f64,
    blood_oxygen: f64,
    temperature: f64,
    respiration_rate: f64,
    anomalies: usize,
    count: usize,
}

impl SummaryAccumulator {
    fn push(&mut self, row: &HistoryRow) {
        self.heart_rate += row.heart_rate;
        self.blood_oxygen += row.blood_oxygen;
        self.temperature += row.temperature;
        self.respiration_rate += row.respiration_rate;
        if row.verdict().is_anomaly() {
            self.anomalies += 1;
        }
        self.count += 1;
    }

    fn finish(self, subject_id: &str) -> SubjectSummary {
        let mean = |sum: f64| if self.count > 0 { sum / self.count as f64 } else { 0.0 };

        SubjectSummary {
            subject_id: subject_id.to_string(),
            mean_heart_rate: mean(self.heart_rate),
            mean_blood_oxygen: mean(self.blood_oxygen),
            mean_temperature: mean(self.temperature),
            mean_respiration_rate: mean(self.respiration_rate),
            anomaly_count: self.anomalies,
            record_count: self.count,
        }
    }
}

/// Parse a log snapshot; an unterminated last line is kept only when it is a
/// complete row
fn parse_rows(bytes: &[u8], subject_id: &str) -> HealthResult<Vec<HistoryRow>> {
    let complete = bytes.iter().rposition(|&b| b == b'\n').map_or(0, |p| p + 1);
    let mut rows = deserialize_rows(&bytes[..complete], subject_id)?;

    let tail = &bytes[complete..];
    if complete > 0 && !tail.iter().all(u8::is_ascii_whitespace) {
        let header_end = bytes.iter().position(|&b| b == b'\n').map_or(0, |p| p + 1);
        let mut candidate = bytes[..header_end].to_vec();
        candidate.extend_from_slice(tail);
        candidate.push(b'\n');

        match deserialize_rows(&candidate, subject_id) {
            Ok(last) => rows.extend(last),
            Err(e) => log::debug!("Skipping unterminated row in log of '{}': {}", subject_id, e),
        }
    }
    Ok(rows)
}

fn deserialize_rows(bytes: &[u8], subject_id: &str) -> HealthResult<Vec<HistoryRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for result in reader.deserialize::<HistoryRow>() {
        let mut row = result?;
        if row.subject_id.is_empty() {
            row.subject_id = subject_id.to_string();
        }
        rows.push(row);
    }
    Ok(rows)
}

pub(super) fn read_rows(store: &HistoryStore, subject_id: &str) -> HealthResult<Vec<HistoryRow>> {
    validate_log_name(subject_id)?;
    let path = store.log_path(subject_id);
    if !path.is_file() {
        return Err(HealthError::NotFound(format!("no history log for subject '{}'", subject_id)));
    }

    let bytes = {
        let lock = file_lock(&path);
        let _guard = lock.lock();
        fs::read(&path)?
    };
    parse_rows(&bytes, subject_id)
}

/// Subject id encoded in a log file name: any non-empty prefix of
/// `_history.csv`
pub fn subject_from_file_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let subject = name.strip_suffix(HISTORY_FILE_SUFFIX)?;
    validate_log_name(subject).ok()?;
    Some(subject.to_string())
}

impl HistoryStore {
    /// Summary of one subject's full log
    pub fn summarize(&self, subject_id: &str) -> HealthResult<SubjectSummary> {
        let rows = read_rows(self, subject_id)?;

        let mut acc = SummaryAccumulator::default();
        for row in rows.iter().filter(|r| r.subject_id == subject_id) {
            acc.push(row);
        }

        let skipped = rows.len() - acc.count;
        if skipped > 0 {
            log::warn!("{} row(s) in log of '{}' belong to another subject", skipped, subject_id);
        }

        Ok(acc.finish(subject_id))
    }

    /// Subjects with an existing log, sorted by file name
    pub fn subjects(&self) -> HealthResult<Vec<String>> {
        let entries = match fs::read_dir(self.base_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths: Vec<_> = entries
            .filter_map(|r| r.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        Ok(paths.iter().filter_map(|p| subject_from_file_name(p)).collect())
    }

    /// One summary per discovered subject log; empty when there are none
    pub fn summarize_all(&self) -> HealthResult<Vec<SubjectSummary>> {
        let subjects = self.subjects()?;
        let summaries = subjects
            .iter()
            .map(|s| self.summarize(s))
            .collect::<HealthResult<Vec<_>>>()?;

        log::info!("Summarized {} subject log(s) in {:?}", summaries.len(), self.base_dir());
        Ok(summaries)
    }
}
