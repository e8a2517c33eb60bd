//! Contamination Threshold
//!
//! Quản lý ngưỡng phát hiện anomaly.
//! The cut-off is the `contamination` quantile of the batch's inlier scores, so
//! roughly `contamination * N` samples fall below it.

use serde::{Deserialize, Serialize};

use crate::logic::error::{HealthError, HealthResult};

/// Linear-interpolated quantile (`q` in [0, 1]) of unsorted values
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Reject contamination outside the open interval (0, 0.5)
pub fn validate_contamination(contamination: f64) -> HealthResult<()> {
    if !(contamination > 0.0 && contamination < 0.5) {
        return Err(HealthError::validation(format!(
            "contamination must be in (0, 0.5), got {}",
            contamination
        )));
    }
    Ok(())
}

/// Fitted cut-off over inlier scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContaminationThreshold {
    pub contamination: f64,
    /// Inlier scores strictly below this are anomalies
    pub offset: f64,
}

impl ContaminationThreshold {
    pub fn fit(scores: &[f64], contamination: f64) -> HealthResult<Self> {
        validate_contamination(contamination)?;
        let offset = quantile(scores, contamination)
            .ok_or(HealthError::InsufficientData { required: 1, actual: 0 })?;

        Ok(Self { contamination, offset })
    }

    pub fn is_anomaly(&self, score: f64) -> bool {
        score < self.offset
    }

    pub fn stats(&self, scores: &[f64]) -> ThresholdStats {
        let n = scores.len();
        let mean = if n > 0 { scores.iter().sum::<f64>() / n as f64 } else { 0.0 };

        ThresholdStats {
            offset: self.offset,
            contamination: self.contamination,
            mean_score: mean,
            flagged: scores.iter().filter(|&&s| self.is_anomaly(s)).count(),
            sample_count: n,
        }
    }
}

/// Threshold statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdStats {
    pub offset: f64,
    pub contamination: f64,
    pub mean_score: f64,
    pub flagged: usize,
    pub sample_count: usize,
}
