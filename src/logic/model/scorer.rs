//! Anomaly Scorer
//!
//! Fit an isolation forest over a normalized batch, calibrate the cut-off with
//! the contamination fraction and tag every sample Normal / Anomaly.
//! The fitted detector is returned as a value; nothing is kept globally.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_SCORING_SAMPLES;
use crate::logic::error::{HealthError, HealthResult};
use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};
use crate::logic::features::scaler::to_matrix;
use crate::logic::features::FeatureVector;
use super::isolation::IsolationForest;
use super::threshold::{ContaminationThreshold, ThresholdStats};
use super::types::{AnomalyVerdict, ScoringConfig};

/// Fitted forest + calibrated threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyDetector {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub config: ScoringConfig,
    forest: IsolationForest,
    threshold: ContaminationThreshold,
}

/// Scorer output for one batch
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    pub verdicts: Vec<AnomalyVerdict>,
    /// Inlier scores, lower = more abnormal
    pub scores: Vec<f64>,
    pub stats: ThresholdStats,
    pub detector: AnomalyDetector,
}

impl ScoredBatch {
    pub fn anomaly_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_anomaly()).count()
    }
}

fn check_vectors(vectors: &[FeatureVector]) -> HealthResult<()> {
    for v in vectors {
        v.validate().map_err(|e| HealthError::validation(e.to_string()))?;
        if v.values.iter().any(|x| !x.is_finite()) {
            return Err(HealthError::validation("feature vector contains non-finite values"));
        }
    }
    Ok(())
}

impl AnomalyDetector {
    /// Fit on a batch and label that same batch
    pub fn fit(vectors: &[FeatureVector], config: &ScoringConfig) -> HealthResult<ScoredBatch> {
        config.validate()?;
        if vectors.len() < MIN_SCORING_SAMPLES {
            return Err(HealthError::InsufficientData {
                required: MIN_SCORING_SAMPLES,
                actual: vectors.len(),
            });
        }
        check_vectors(vectors)?;

        let matrix = to_matrix(vectors);
        let forest = IsolationForest::fit(&matrix, &config.forest_params())?;
        let scores = forest.score_samples(&matrix)?;
        let threshold = ContaminationThreshold::fit(&scores, config.contamination)?;

        let verdicts = label(&scores, &threshold);
        let stats = threshold.stats(&scores);

        log::info!(
            "Scored {} samples: {} anomalies (contamination={}, seed={})",
            vectors.len(),
            stats.flagged,
            config.contamination,
            config.seed
        );

        Ok(ScoredBatch {
            verdicts,
            scores,
            stats,
            detector: Self {
                feature_version: FEATURE_VERSION,
                layout_hash: layout_hash(),
                config: *config,
                forest,
                threshold,
            },
        })
    }

    /// Label a new batch with the already-fitted forest and cut-off
    pub fn predict(&self, vectors: &[FeatureVector]) -> HealthResult<Vec<AnomalyVerdict>> {
        if self.feature_version != FEATURE_VERSION || self.layout_hash != layout_hash() {
            return Err(HealthError::validation("detector was fitted on a different feature layout"));
        }
        if vectors.is_empty() {
            return Ok(Vec::new());
        }
        check_vectors(vectors)?;

        let scores = self.forest.score_samples(&to_matrix(vectors))?;
        Ok(label(&scores, &self.threshold))
    }

    pub fn threshold(&self) -> &ContaminationThreshold {
        &self.threshold
    }
}

fn label(scores: &[f64], threshold: &ContaminationThreshold) -> Vec<AnomalyVerdict> {
    scores
        .iter()
        .map(|&s| {
            if threshold.is_anomaly(s) {
                AnomalyVerdict::Anomaly
            } else {
                AnomalyVerdict::Normal
            }
        })
        .collect()
}

/// Anomaly Scorer entry point: one verdict per vector
pub fn detect_anomalies(
    vectors: &[FeatureVector],
    contamination: f64,
    seed: u64,
) -> HealthResult<Vec<AnomalyVerdict>> {
    let config = ScoringConfig::new(contamination, seed);
    Ok(AnomalyDetector::fit(vectors, &config)?.verdicts)
}
