use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONTAMINATION, DEFAULT_ESTIMATORS, DEFAULT_MAX_SAMPLES, DEFAULT_SEED};
use crate::logic::error::{HealthError, HealthResult};
use super::isolation::ForestParams;
use super::threshold::validate_contamination;

/// Per-sample verdict produced by the scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnomalyVerdict {
    #[default]
    Normal,
    Anomaly,
}

impl AnomalyVerdict {
    pub fn is_anomaly(self) -> bool {
        self == AnomalyVerdict::Anomaly
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyVerdict::Normal => "Normal",
            AnomalyVerdict::Anomaly => "Anomaly",
        }
    }
}

impl fmt::Display for AnomalyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnomalyVerdict {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Normal" | "normal" => Ok(AnomalyVerdict::Normal),
            "Anomaly" | "anomaly" => Ok(AnomalyVerdict::Anomaly),
            other => Err(HealthError::validation(format!("unknown verdict '{}'", other))),
        }
    }
}

/// Scorer parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Expected outlier fraction, (0, 0.5)
    pub contamination: f64,
    pub seed: u64,
    pub n_estimators: usize,
    pub max_samples: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
            n_estimators: DEFAULT_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl ScoringConfig {
    pub fn new(contamination: f64, seed: u64) -> Self {
        Self {
            contamination,
            seed,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> HealthResult<()> {
        validate_contamination(self.contamination)
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            max_samples: self.max_samples,
            seed: self.seed,
        }
    }
}
