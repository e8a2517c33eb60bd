//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change default scoring behaviour, only edit this file.

/// Default expected outlier fraction for the anomaly scorer
pub const DEFAULT_CONTAMINATION: f64 = 0.05;

/// Default seed for the isolation forest (same seed => same verdicts)
pub const DEFAULT_SEED: u64 = 42;

/// Default number of isolation trees
pub const DEFAULT_ESTIMATORS: usize = 100;

/// Default subsample size per tree
pub const DEFAULT_MAX_SAMPLES: usize = 256;

/// Minimum batch size the scorer accepts
pub const MIN_SCORING_SAMPLES: usize = 2;

/// Suffix used to discover per-subject history logs
pub const HISTORY_FILE_SUFFIX: &str = "_history.csv";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "AI Health Monitor";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get history directory from environment or use default
pub fn get_history_dir() -> std::path::PathBuf {
    std::env::var("HEALTH_HISTORY_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_history_dir())
}

/// Default history directory under the user's local data dir
pub fn default_history_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("ai-health")
        .join("history")
}

/// Get contamination from environment or use default
pub fn get_contamination() -> f64 {
    std::env::var("HEALTH_CONTAMINATION")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CONTAMINATION)
}

/// Get scoring seed from environment or use default
pub fn get_seed() -> u64 {
    std::env::var("HEALTH_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

/// Get number of trees from environment or use default
pub fn get_estimators() -> usize {
    std::env::var("HEALTH_ESTIMATORS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ESTIMATORS)
}
