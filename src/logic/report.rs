//! Anomaly Report Export
//!
//! Writes one analyzed batch to a flat CSV (sample + verdict + advice).

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::logic::analysis::{AnalysisReport, AnalyzedSample};
use crate::logic::error::HealthResult;

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    subject_id: &'a str,
    timestamp: String,
    heart_rate: f64,
    blood_oxygen: f64,
    temperature: f64,
    respiration_rate: f64,
    activity_level: &'static str,
    anomaly: &'static str,
    score: f64,
    recommendation: &'a str,
}

impl<'a> From<&'a AnalyzedSample> for ReportRow<'a> {
    fn from(a: &'a AnalyzedSample) -> Self {
        Self {
            subject_id: &a.sample.subject_id,
            timestamp: a.sample.timestamp.to_rfc3339(),
            heart_rate: a.sample.heart_rate,
            blood_oxygen: a.sample.blood_oxygen,
            temperature: a.sample.temperature,
            respiration_rate: a.sample.respiration_rate,
            activity_level: a.sample.activity_level.as_str(),
            anomaly: a.verdict.as_str(),
            score: a.score,
            recommendation: &a.recommendation.text,
        }
    }
}

/// Export the batch to `target_path` (truncated if it exists).
/// Returns the number of rows written.
pub fn export_report(report: &AnalysisReport, target_path: &Path) -> HealthResult<usize> {
    if let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_writer(File::create(target_path)?);
    for analyzed in &report.samples {
        writer.serialize(ReportRow::from(analyzed))?;
    }
    writer.flush()?;

    log::info!(
        "Exported anomaly report for batch {} ({} rows) to {:?}",
        report.batch_id,
        report.samples.len(),
        target_path
    );
    Ok(report.samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::analysis::analyze_batch;
    use crate::logic::model::ScoringConfig;
    use crate::logic::simulate::{simulate, SimulationConfig};

    #[test]
    fn test_export_report() {
        let samples = simulate(&SimulationConfig { subjects: 2, minutes: 25, seed: 3, ..Default::default() });
        let report = analyze_batch(&samples, &ScoringConfig::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("anomaly_report.csv");
        assert_eq!(export_report(&report, &path).unwrap(), 50);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(7), Some("anomaly"));
        assert_eq!(headers.get(9), Some("recommendation"));

        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 50);
        let flagged = rows.iter().filter(|r| r.get(7) == Some("Anomaly")).count();
        assert_eq!(flagged, report.anomaly_count());
    }
}
