//! Clinical Advisory Rules & Thresholds
//!
//! Định nghĩa các threshold cho advisory.
//! KHÔNG chứa logic evaluate - chỉ constants và config.

use serde::{Deserialize, Serialize};

// ============================================================================
// THRESHOLDS (Constants - không đổi lúc runtime)
// ============================================================================

/// Above this heart rate (bpm) = tachycardia advisory
pub const HIGH_HEART_RATE: f64 = 100.0;

/// Below this SpO2 (%) = low oxygen advisory
pub const LOW_BLOOD_OXYGEN: f64 = 92.0;

/// Above this temperature (°C) = fever advisory
pub const FEVER_TEMPERATURE: f64 = 37.5;

// ============================================================================
// MESSAGES
// ============================================================================

pub const HIGH_HEART_RATE_MSG: &str = "High heart rate detected. Consider resting.";
pub const LOW_OXYGEN_MSG: &str = "Low blood oxygen. Seek medical attention if persistent.";
pub const FEVER_MSG: &str = "Fever detected. Monitor temperature.";
pub const NORMAL_MSG: &str = "Vitals are within normal range.";

/// Separator between concatenated advisories
pub const ADVICE_SEPARATOR: &str = " ";

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// Thresholds for advisories (configurable)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicalThresholds {
    /// Strictly above = high heart rate
    pub heart_rate_max: f64,
    /// Strictly below = low oxygen
    pub blood_oxygen_min: f64,
    /// Strictly above = fever
    pub temperature_max: f64,
}

impl Default for ClinicalThresholds {
    fn default() -> Self {
        Self {
            heart_rate_max: HIGH_HEART_RATE,
            blood_oxygen_min: LOW_BLOOD_OXYGEN,
            temperature_max: FEVER_TEMPERATURE,
        }
    }
}
