//! Vital Sample - one raw reading for a monitored subject

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::error::{HealthError, HealthResult};

/// Categorical activity level reported with each reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 3] = [ActivityLevel::Low, ActivityLevel::Moderate, ActivityLevel::High];

    /// Ordinal encoding used in the feature vector
    pub fn encode(self) -> f64 {
        match self {
            ActivityLevel::Low => 0.0,
            ActivityLevel::Moderate => 1.0,
            ActivityLevel::High => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::High => "high",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ActivityLevel::Low),
            "moderate" => Ok(ActivityLevel::Moderate),
            "high" => Ok(ActivityLevel::High),
            other => Err(HealthError::validation(format!("unknown activity level '{}'", other))),
        }
    }
}

/// One vital-sign reading. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSample {
    pub subject_id: String,
    pub timestamp: DateTime<Utc>,
    /// beats/min
    pub heart_rate: f64,
    /// percent, 0-100
    pub blood_oxygen: f64,
    /// °C
    pub temperature: f64,
    /// breaths/min
    pub respiration_rate: f64,
    pub activity_level: ActivityLevel,
}

impl VitalSample {
    /// Reject malformed readings before they reach the normalizer
    pub fn validate(&self) -> HealthResult<()> {
        if self.subject_id.trim().is_empty() {
            return Err(HealthError::validation("subject_id is empty"));
        }

        let fields = [
            ("heart_rate", self.heart_rate),
            ("blood_oxygen", self.blood_oxygen),
            ("temperature", self.temperature),
            ("respiration_rate", self.respiration_rate),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(HealthError::validation(format!(
                    "{} for subject '{}' is not a finite number",
                    name, self.subject_id
                )));
            }
        }

        if !(0.0..=100.0).contains(&self.blood_oxygen) {
            return Err(HealthError::validation(format!(
                "blood_oxygen {} for subject '{}' is outside [0, 100]",
                self.blood_oxygen, self.subject_id
            )));
        }
        if self.heart_rate < 0.0 || self.respiration_rate < 0.0 {
            return Err(HealthError::validation(format!(
                "negative rate for subject '{}'",
                self.subject_id
            )));
        }

        Ok(())
    }

    /// Raw (unscaled) feature values in `FEATURE_LAYOUT` order
    pub fn raw_features(&self) -> [f64; super::FEATURE_COUNT] {
        [
            self.heart_rate,
            self.blood_oxygen,
            self.temperature,
            self.respiration_rate,
            self.activity_level.encode(),
        ]
    }
}
