//! History Writer - append-only per-subject CSV logs
//!
//! One file per subject: `<dir>/<subject_id>_history.csv`.
//! Appends to the same subject are serialized by a per-file lock; every batch of
//! rows is encoded in memory first and hits the file in a single `write_all`,
//! so a reader never sees half a row from this process.
//!
//! Rows follow the header already present in the file, so logs written by
//! older tools (`user_id`, no `anomaly`, extra columns) stay readable.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

use crate::constants::HISTORY_FILE_SUFFIX;
use crate::logic::error::{HealthError, HealthResult};
use super::record::{HistoryRecord, HistoryRow, HISTORY_COLUMNS};

// ============================================================================
// STATE
// ============================================================================

/// Per-file write locks, shared by every store in the process
static FILE_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

static SUBJECT_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("valid subject id regex"));

/// Registry key: canonical parent dir + file name, so `dir/x` and `./dir/x`
/// share one lock. The parent exists whenever a lock is taken.
fn lock_key(path: &Path) -> PathBuf {
    match (path.parent().map(fs::canonicalize), path.file_name()) {
        (Some(Ok(dir)), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

pub(super) fn file_lock(path: &Path) -> Arc<Mutex<()>> {
    FILE_LOCKS
        .lock()
        .entry(lock_key(path))
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Subject ids become file names, so keep them to a safe character set
pub fn validate_subject_id(subject_id: &str) -> HealthResult<()> {
    if SUBJECT_ID_PATTERN.is_match(subject_id) {
        Ok(())
    } else {
        Err(HealthError::validation(format!(
            "subject id '{}' is not a valid log name",
            subject_id
        )))
    }
}

/// Read-side check: any non-empty file-name component. Logs created by other
/// tools may use ids `validate_subject_id` would refuse.
pub fn validate_log_name(subject_id: &str) -> HealthResult<()> {
    let unsafe_name = subject_id.is_empty()
        || subject_id == "."
        || subject_id == ".."
        || subject_id.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(HealthError::validation(format!(
            "subject id '{}' is not a valid log name",
            subject_id
        )));
    }
    Ok(())
}

// ============================================================================
// EXISTING LOG LAYOUT
// ============================================================================

/// What an append must respect in a log that already has content
#[derive(Debug, Default)]
struct ExistingLog {
    /// Header of the file; `None` when the file has no header yet
    columns: Option<Vec<String>>,
    /// Last byte is not a newline
    unterminated: bool,
}

fn inspect_log(path: &Path) -> HealthResult<ExistingLog> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ExistingLog::default()),
        Err(e) => return Err(e.into()),
    };
    if len == 0 {
        return Ok(ExistingLog::default());
    }

    let mut file = File::open(path)?;
    let mut first_line = String::new();
    BufReader::new(&mut file).read_line(&mut first_line)?;

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;

    let columns = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(first_line.as_bytes())
        .records()
        .next()
        .transpose()?
        .map(|header| header.iter().map(str::to_string).collect::<Vec<_>>())
        .filter(|columns| columns.iter().any(|c| !c.is_empty()));

    Ok(ExistingLog { columns, unterminated: last[0] != b'\n' })
}

// ============================================================================
// STORE
// ============================================================================

/// Directory of per-subject history logs
#[derive(Debug, Clone)]
pub struct HistoryStore {
    base_dir: PathBuf,
}

impl HistoryStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Store rooted at the configured history directory
    pub fn from_config(config: &crate::logic::config::Config) -> Self {
        Self::new(config.history_dir.clone())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn log_path(&self, subject_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}{}", subject_id, HISTORY_FILE_SUFFIX))
    }

    pub fn exists(&self, subject_id: &str) -> bool {
        self.log_path(subject_id).is_file()
    }

    /// Append one record to the subject's log
    pub fn append(&self, subject_id: &str, record: &HistoryRecord) -> HealthResult<()> {
        self.append_rows(subject_id, std::slice::from_ref(record))
    }

    /// Append many records, grouped by subject (one lock per subject).
    /// Returns the number of rows written.
    pub fn append_batch(&self, records: &[HistoryRecord]) -> HealthResult<usize> {
        let mut by_subject: BTreeMap<&str, Vec<HistoryRecord>> = BTreeMap::new();
        for record in records {
            by_subject.entry(record.subject_id()).or_default().push(record.clone());
        }

        let mut written = 0;
        for (subject_id, group) in by_subject {
            self.append_rows(subject_id, &group)?;
            written += group.len();
        }
        Ok(written)
    }

    fn append_rows(&self, subject_id: &str, records: &[HistoryRecord]) -> HealthResult<()> {
        validate_subject_id(subject_id)?;
        for record in records {
            if record.subject_id() != subject_id {
                return Err(HealthError::validation(format!(
                    "record for '{}' cannot be appended to log of '{}'",
                    record.subject_id(),
                    subject_id
                )));
            }
            record.sample.validate()?;
        }
        if records.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.base_dir)?;
        let path = self.log_path(subject_id);

        let lock = file_lock(&path);
        let _guard = lock.lock();

        let existing = inspect_log(&path)?;
        let mut buf = Vec::new();
        if existing.unterminated {
            buf.push(b'\n');
        }

        // Header only on the first write to a new (or empty) file
        let write_header = existing.columns.is_none();
        let columns: Vec<String> = match existing.columns {
            Some(columns) => columns,
            None => HISTORY_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };

        if !columns.iter().any(|c| c == "anomaly") {
            log::warn!("{:?} has no anomaly column; verdicts are not stored", path);
        }

        let mut encoder = csv::WriterBuilder::new().has_headers(false).from_writer(buf);
        if write_header {
            encoder.write_record(&columns)?;
        }
        for record in records {
            let row = HistoryRow::from(record);
            encoder.write_record(columns.iter().map(|c| row.field(c)))?;
        }
        let buf = encoder.into_inner().map_err(|e| e.into_error())?;

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(&buf)?;
        file.flush()?;

        log::debug!("Appended {} record(s) to {:?}", records.len(), path);
        Ok(())
    }

    /// Read every record of a subject's log
    pub fn read_records(&self, subject_id: &str) -> HealthResult<Vec<HistoryRecord>> {
        super::summary::read_rows(self, subject_id)?
            .into_iter()
            .map(HistoryRecord::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_missing_and_unterminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_1_history.csv");

        let missing = inspect_log(&path).unwrap();
        assert!(missing.columns.is_none());
        assert!(!missing.unterminated);

        fs::write(&path, "user_id,timestamp,heart_rate\nuser_1,2024-01-01 08:00:00,70").unwrap();
        let log = inspect_log(&path).unwrap();
        assert_eq!(log.columns.unwrap(), vec!["user_id", "timestamp", "heart_rate"]);
        assert!(log.unterminated);
    }

    #[cfg(unix)]
    #[test]
    fn test_inspect_propagates_metadata_errors() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain");
        fs::write(&plain, "x").unwrap();

        // Parent is a regular file: ENOTDIR, not NotFound
        let result = inspect_log(&plain.join("user_1_history.csv"));
        assert!(matches!(result, Err(HealthError::Io(_))));
    }

    #[test]
    fn test_log_names() {
        assert!(validate_log_name("Jane Doe").is_ok());
        assert!(validate_log_name("").is_err());
        assert!(validate_log_name("..").is_err());
        assert!(validate_log_name("a/b").is_err());
        assert!(validate_subject_id("Jane Doe").is_err());
    }
}
