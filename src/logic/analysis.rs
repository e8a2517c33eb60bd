//! Analysis Pipeline
//!
//! Bridges the stages for one batch:
//! raw samples → Normalizer → Scorer (verdict), raw samples → Recommendation
//! Engine (advice), then verdict + advice + sample → History.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::advice::{self, ClinicalThresholds, Recommendation};
use crate::logic::error::HealthResult;
use crate::logic::features::{normalize, Scaler, VitalSample};
use crate::logic::history::{HistoryRecord, HistoryStore};
use crate::logic::model::{AnomalyDetector, AnomalyVerdict, ScoringConfig, ThresholdStats};

/// One sample after scoring and advice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedSample {
    pub sample: VitalSample,
    pub verdict: AnomalyVerdict,
    /// Inlier score, lower = more abnormal
    pub score: f64,
    pub recommendation: Recommendation,
}

/// Result of analyzing one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub batch_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub samples: Vec<AnalyzedSample>,
    pub scaler: Scaler,
    pub stats: ThresholdStats,
    #[serde(skip)]
    pub detector: Option<AnomalyDetector>,
}

impl AnalysisReport {
    pub fn anomaly_count(&self) -> usize {
        self.samples.iter().filter(|s| s.verdict.is_anomaly()).count()
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &AnalyzedSample> {
        self.samples.iter().filter(|s| s.verdict.is_anomaly())
    }

    pub fn verdicts(&self) -> Vec<AnomalyVerdict> {
        self.samples.iter().map(|s| s.verdict).collect()
    }

    pub fn history_records(&self) -> Vec<HistoryRecord> {
        self.samples
            .iter()
            .map(|s| HistoryRecord::new(s.sample.clone(), s.verdict))
            .collect()
    }
}

/// Analyze a batch with default clinical thresholds
pub fn analyze_batch(samples: &[VitalSample], config: &ScoringConfig) -> HealthResult<AnalysisReport> {
    analyze_with_thresholds(samples, config, &ClinicalThresholds::default())
}

pub fn analyze_with_thresholds(
    samples: &[VitalSample],
    config: &ScoringConfig,
    thresholds: &ClinicalThresholds,
) -> HealthResult<AnalysisReport> {
    // 1. Normalize (fails fast on any invalid sample)
    let normalized = normalize(samples)?;

    // 2. Score
    let scored = AnomalyDetector::fit(&normalized.vectors, config)?;

    // 3. Advice on raw vitals, independent of the verdict
    let analyzed: Vec<AnalyzedSample> = samples
        .iter()
        .zip(scored.verdicts.iter().zip(scored.scores.iter()))
        .map(|(sample, (&verdict, &score))| AnalyzedSample {
            sample: sample.clone(),
            verdict,
            score,
            recommendation: advice::recommend_with_thresholds(sample, thresholds),
        })
        .collect();

    let report = AnalysisReport {
        batch_id: Uuid::new_v4(),
        created_at: Utc::now(),
        samples: analyzed,
        scaler: normalized.scaler,
        stats: scored.stats,
        detector: Some(scored.detector),
    };

    log::info!(
        "Batch {} analyzed: {} samples, {} anomalies",
        report.batch_id,
        report.samples.len(),
        report.anomaly_count()
    );

    Ok(report)
}

/// Persist every analyzed sample to its subject's history log
pub fn record_report(report: &AnalysisReport, store: &HistoryStore) -> HealthResult<usize> {
    let written = store.append_batch(&report.history_records())?;
    log::info!("Batch {}: {} record(s) appended to history", report.batch_id, written);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::advice::NORMAL_MSG;
    use crate::logic::simulate::{simulate, SimulationConfig};

    fn simulated(subjects: usize, minutes: usize) -> Vec<VitalSample> {
        simulate(&SimulationConfig { subjects, minutes, seed: 17, ..Default::default() })
    }

    #[test]
    fn test_analyze_batch_shapes() {
        let samples = simulated(2, 60);
        let report = analyze_batch(&samples, &ScoringConfig::default()).unwrap();

        assert_eq!(report.samples.len(), 120);
        assert_eq!(report.scaler.n_samples, 120);
        assert_eq!(report.anomaly_count(), report.stats.flagged);
        assert_eq!(report.anomalies().count(), report.anomaly_count());
        assert!(report.detector.is_some());
    }

    #[test]
    fn test_advice_independent_of_verdict() {
        let mut samples = simulated(1, 50);
        samples[10].temperature = 38.4;
        let report = analyze_batch(&samples, &ScoringConfig::default()).unwrap();

        for analyzed in &report.samples {
            assert_eq!(analyzed.recommendation, advice::recommend(&analyzed.sample));
        }
        assert_ne!(report.samples[10].recommendation.text, NORMAL_MSG);
    }

    #[test]
    fn test_deterministic_verdicts() {
        let samples = simulated(3, 40);
        let a = analyze_batch(&samples, &ScoringConfig::new(0.1, 7)).unwrap();
        let b = analyze_batch(&samples, &ScoringConfig::new(0.1, 7)).unwrap();
        assert_eq!(a.verdicts(), b.verdicts());
        assert_ne!(a.batch_id, b.batch_id);
    }

    #[test]
    fn test_record_report_appends_per_subject() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        let report = analyze_batch(&simulated(3, 30), &ScoringConfig::default()).unwrap();

        assert_eq!(record_report(&report, &store).unwrap(), 90);

        let summaries = store.summarize_all().unwrap();
        assert_eq!(summaries.len(), 3);
        assert!(summaries.iter().all(|s| s.record_count == 30));

        let total: usize = summaries.iter().map(|s| s.anomaly_count).sum();
        assert_eq!(total, report.anomaly_count());
    }
}
