//! AI Health Core
//!
//! Vital-sign anomaly scoring: batch normalization, isolation forest verdicts,
//! rule-based recommendations and per-subject history logs.

pub mod api;
pub mod constants;
pub mod logic;

pub use logic::config::Config;
pub use logic::error::{HealthError, HealthResult};
