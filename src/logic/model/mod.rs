//! Model Module - Anomaly Scorer
//!
//! Tách logic scoring khỏi feature normalization.
//! Isolation forest + contamination threshold → per-sample verdict.

pub mod isolation;
pub mod scorer;
pub mod threshold;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export common types
pub use isolation::{ForestParams, IsolationForest};
pub use scorer::{detect_anomalies, AnomalyDetector, ScoredBatch};
pub use threshold::{ContaminationThreshold, ThresholdStats};
pub use types::{AnomalyVerdict, ScoringConfig};
