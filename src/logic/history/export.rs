use std::fs::File;
use std::path::Path;

use crate::logic::error::HealthResult;
use super::summary::read_rows;
use super::writer::HistoryStore;

/// Merge every subject log into a single CSV at `target_path`.
/// Returns the number of subject logs merged.
pub fn to_combined_csv(store: &HistoryStore, target_path: &Path) -> HealthResult<usize> {
    let subjects = store.subjects()?;

    // Create target file (truncate if exists)
    let mut writer = csv::Writer::from_writer(File::create(target_path)?);
    let mut rows_written = 0;

    for subject in &subjects {
        for row in read_rows(store, subject)? {
            writer.serialize(row)?;
            rows_written += 1;
        }
    }

    writer.flush()?;
    log::info!(
        "Exported {} rows from {} history logs to {:?}",
        rows_written,
        subjects.len(),
        target_path
    );
    Ok(subjects.len())
}
