//! Advice Module - Recommendation Engine
//!
//! Turns raw vitals into advisory text using fixed clinical thresholds.
//!
//! ## Structure
//! - `types`: `Advisory`, `Recommendation`
//! - `rules`: Thresholds, messages
//! - `engine`: Evaluation logic
//!
//! ## Usage
//! ```ignore
//! use crate::logic::advice::recommend;
//!
//! let rec = recommend(&sample);
//! println!("{}", rec.text);
//! ```

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{evaluate, generate_recommendations, recommend, recommend_with_thresholds};
pub use rules::{ClinicalThresholds, NORMAL_MSG};
pub use types::{Advisory, Recommendation};
