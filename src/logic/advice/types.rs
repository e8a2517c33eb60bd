use serde::{Deserialize, Serialize};

use super::rules::{FEVER_MSG, HIGH_HEART_RATE_MSG, LOW_OXYGEN_MSG};

/// One triggered rule, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Advisory {
    HighHeartRate,
    LowBloodOxygen,
    Fever,
}

impl Advisory {
    pub fn message(self) -> &'static str {
        match self {
            Advisory::HighHeartRate => HIGH_HEART_RATE_MSG,
            Advisory::LowBloodOxygen => LOW_OXYGEN_MSG,
            Advisory::Fever => FEVER_MSG,
        }
    }
}

/// Advisory text for one sample, plus the rules behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub advisories: Vec<Advisory>,
    pub text: String,
}

impl Recommendation {
    pub fn is_normal(&self) -> bool {
        self.advisories.is_empty()
    }
}
