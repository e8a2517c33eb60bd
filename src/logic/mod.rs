//! Logic Module - Business Logic & Engines
//!
//! Chứa các engines xử lý: Normalizer, Scorer, Advice, History.
//!
//! ## Architecture
//! - `features/` - Vital sample layout + batch normalization
//! - `model/` - Isolation forest scoring, contamination threshold
//! - `advice/` - Clinical rule recommendations
//! - `history/` - Per-subject CSV logs and summaries
//! - `analysis` - Pipeline tying the stages together for one batch

// Core modules
pub mod config;
pub mod error;

// Engines
pub mod features;
pub mod model;
pub mod advice;
pub mod history;

// Pipeline + tooling
pub mod analysis;
pub mod evaluation;
pub mod report;
pub mod simulate;
