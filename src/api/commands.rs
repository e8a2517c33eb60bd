//! Commands - API cho presentation layer
//!
//! Every call takes the loaded `Config`, does one unit of work, and hands back
//! serializable data. Rendering (charts, tables) is the caller's job.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::engine_status::{EngineStatus, HistoryStatus, ModelStatus};
use crate::logic::analysis::{self, AnalysisReport};
use crate::logic::config::Config;
use crate::logic::error::HealthResult;
use crate::logic::features::{layout::LayoutInfo, VitalSample};
use crate::logic::history::{export, HistoryStore, SubjectSummary};
use crate::logic::report;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One flagged sample, flattened for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyInfo {
    pub subject_id: String,
    pub timestamp: String,
    pub score: f64,
    pub recommendation: String,
}

/// Outcome of `analyze_and_record`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: String,
    pub sample_count: usize,
    pub anomaly_count: usize,
    pub records_written: usize,
    pub threshold: f64,
    pub anomalies: Vec<AnomalyInfo>,
}

impl From<&AnalysisReport> for BatchResult {
    fn from(report: &AnalysisReport) -> Self {
        Self {
            batch_id: report.batch_id.to_string(),
            sample_count: report.samples.len(),
            anomaly_count: report.anomaly_count(),
            records_written: 0,
            threshold: report.stats.offset,
            anomalies: report
                .anomalies()
                .map(|a| AnomalyInfo {
                    subject_id: a.sample.subject_id.clone(),
                    timestamp: a.sample.timestamp.to_rfc3339(),
                    score: a.score,
                    recommendation: a.recommendation.text.clone(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// ANALYSIS COMMANDS
// ============================================================================

/// Score a batch without touching history
pub fn analyze(config: &Config, samples: &[VitalSample]) -> HealthResult<AnalysisReport> {
    analysis::analyze_batch(samples, &config.scoring())
}

/// Score a batch and append every labeled sample to its subject log
pub fn analyze_and_record(config: &Config, samples: &[VitalSample]) -> HealthResult<BatchResult> {
    let report = analyze(config, samples)?;
    record_analysis(config, &report)
}

/// Append an already analyzed batch to history
pub fn record_analysis(config: &Config, report: &AnalysisReport) -> HealthResult<BatchResult> {
    let store = HistoryStore::from_config(config);
    let written = analysis::record_report(report, &store)?;

    let mut result = BatchResult::from(report);
    result.records_written = written;
    Ok(result)
}

/// Write the per-sample anomaly report for an analyzed batch
pub fn export_anomaly_report(report: &AnalysisReport, path: &Path) -> HealthResult<usize> {
    report::export_report(report, path)
}

// ============================================================================
// HISTORY COMMANDS
// ============================================================================

pub fn get_subject_summary(config: &Config, subject_id: &str) -> HealthResult<SubjectSummary> {
    HistoryStore::from_config(config).summarize(subject_id)
}

/// One summary per subject log, ordered by file name
pub fn get_overall_summary(config: &Config) -> HealthResult<Vec<SubjectSummary>> {
    HistoryStore::from_config(config).summarize_all()
}

pub fn list_subjects(config: &Config) -> HealthResult<Vec<String>> {
    HistoryStore::from_config(config).subjects()
}

/// Merge every subject log into one CSV; returns number of subjects merged
pub fn export_history(config: &Config, path: &Path) -> HealthResult<usize> {
    export::to_combined_csv(&HistoryStore::from_config(config), path)
}

// ============================================================================
// STATUS
// ============================================================================

pub fn get_layout_info() -> LayoutInfo {
    LayoutInfo::current()
}

pub fn get_engine_status(config: &Config) -> HealthResult<EngineStatus> {
    let summaries = get_overall_summary(config)?;
    let layout = LayoutInfo::current();
    let scoring = config.scoring();

    Ok(EngineStatus {
        feature_version: layout.version,
        layout_hash: layout.hash,
        feature_count: layout.feature_count,
        history: HistoryStatus {
            directory: config.history_dir.display().to_string(),
            subject_logs: summaries.len(),
            total_records: summaries.iter().map(|s| s.record_count).sum(),
            total_anomalies: summaries.iter().map(|s| s.anomaly_count).sum(),
        },
        model: ModelStatus {
            engine: "isolation_forest".to_string(),
            contamination: scoring.contamination,
            seed: scoring.seed,
            n_estimators: scoring.n_estimators,
            max_samples: scoring.max_samples,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::simulate::{simulate, SimulationConfig};

    fn config_in(dir: &Path) -> Config {
        Config { history_dir: dir.to_path_buf(), ..Config::default() }
    }

    #[test]
    fn test_analyze_and_record_then_summaries() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let samples = simulate(&SimulationConfig { subjects: 2, minutes: 40, seed: 9, ..Default::default() });

        let result = analyze_and_record(&config, &samples).unwrap();
        assert_eq!(result.sample_count, 80);
        assert_eq!(result.records_written, 80);
        assert_eq!(result.anomalies.len(), result.anomaly_count);

        assert_eq!(list_subjects(&config).unwrap(), vec!["user_1", "user_2"]);
        assert_eq!(get_subject_summary(&config, "user_2").unwrap().record_count, 40);

        let status = get_engine_status(&config).unwrap();
        assert_eq!(status.history.subject_logs, 2);
        assert_eq!(status.history.total_records, 80);
        assert_eq!(status.history.total_anomalies, result.anomaly_count);
        assert_eq!(status.feature_count, 5);
    }

    #[test]
    fn test_status_on_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let status = get_engine_status(&config_in(&dir.path().join("missing"))).unwrap();
        assert_eq!(status.history.subject_logs, 0);
        assert_eq!(status.model.engine, "isolation_forest");
    }
}
