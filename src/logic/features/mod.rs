//! Features Module - Feature Normalizer
//!
//! Tách logic chuẩn hóa features khỏi scoring.
//! Raw `VitalSample` → encoded row → batch-scaled `FeatureVector`.

pub mod layout;
pub mod sample;
pub mod scaler;
pub mod vector;


// Re-export common types
pub use layout::{feature_name, FEATURE_COUNT, FEATURE_LAYOUT};
pub use sample::{ActivityLevel, VitalSample};
pub use scaler::{normalize, NormalizedBatch, Scaler};
pub use vector::FeatureVector;
