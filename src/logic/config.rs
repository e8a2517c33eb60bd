//! Configuration module

use std::path::PathBuf;

use crate::constants;
use crate::logic::model::ScoringConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `<subject_id>_history.csv` logs
    pub history_dir: PathBuf,

    /// Expected outlier fraction
    pub contamination: f64,

    /// Isolation forest seed
    pub seed: u64,

    /// Number of isolation trees
    pub n_estimators: usize,
}

impl Config {
    /// Load configuration from environment variables (`.env` is honoured)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            history_dir: constants::get_history_dir(),
            contamination: constants::get_contamination(),
            seed: constants::get_seed(),
            n_estimators: constants::get_estimators(),
        }
    }

    /// Scorer parameters derived from this config
    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            contamination: self.contamination,
            seed: self.seed,
            n_estimators: self.n_estimators,
            ..ScoringConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_dir: constants::default_history_dir(),
            contamination: constants::DEFAULT_CONTAMINATION,
            seed: constants::DEFAULT_SEED,
            n_estimators: constants::DEFAULT_ESTIMATORS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_matches_constants() {
        let config = Config::default();
        let scoring = config.scoring();
        assert_eq!(scoring.contamination, constants::DEFAULT_CONTAMINATION);
        assert_eq!(scoring.seed, constants::DEFAULT_SEED);
        assert_eq!(scoring.n_estimators, constants::DEFAULT_ESTIMATORS);
        assert_eq!(scoring.max_samples, constants::DEFAULT_MAX_SAMPLES);
    }
}
