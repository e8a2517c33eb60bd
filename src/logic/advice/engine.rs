//! Recommendation Engine
//!
//! CHỈ chứa logic evaluate - không có thresholds.
//! Input: raw `VitalSample` (unscaled). Output: `Recommendation`.
//!
//! Pure function of the sample: no dependency on the anomaly verdict or on the
//! scaled feature space. Never fails; a NaN reading triggers nothing.

use crate::logic::features::VitalSample;
use super::rules::{ClinicalThresholds, ADVICE_SEPARATOR, NORMAL_MSG};
use super::types::{Advisory, Recommendation};

/// Rules that fire for this sample, in fixed order
pub fn evaluate(sample: &VitalSample, thresholds: &ClinicalThresholds) -> Vec<Advisory> {
    let mut fired = Vec::new();

    if sample.heart_rate > thresholds.heart_rate_max {
        fired.push(Advisory::HighHeartRate);
    }
    if sample.blood_oxygen < thresholds.blood_oxygen_min {
        fired.push(Advisory::LowBloodOxygen);
    }
    if sample.temperature > thresholds.temperature_max {
        fired.push(Advisory::Fever);
    }

    fired
}

/// Recommendation with custom thresholds
pub fn recommend_with_thresholds(sample: &VitalSample, thresholds: &ClinicalThresholds) -> Recommendation {
    let advisories = evaluate(sample, thresholds);

    let text = if advisories.is_empty() {
        NORMAL_MSG.to_string()
    } else {
        advisories
            .iter()
            .map(|a| a.message())
            .collect::<Vec<_>>()
            .join(ADVICE_SEPARATOR)
    };

    Recommendation { advisories, text }
}

/// Recommendation with the default clinical thresholds
pub fn recommend(sample: &VitalSample) -> Recommendation {
    recommend_with_thresholds(sample, &ClinicalThresholds::default())
}

/// Advisory text for each sample of a batch
pub fn generate_recommendations(samples: &[VitalSample]) -> Vec<String> {
    samples.iter().map(|s| recommend(s).text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::advice::rules::{FEVER_MSG, HIGH_HEART_RATE_MSG, LOW_OXYGEN_MSG};
    use crate::logic::features::ActivityLevel;
    use chrono::Utc;

    fn sample(hr: f64, spo2: f64, temp: f64) -> VitalSample {
        VitalSample {
            subject_id: "user_1".to_string(),
            timestamp: Utc::now(),
            heart_rate: hr,
            blood_oxygen: spo2,
            temperature: temp,
            respiration_rate: 16.0,
            activity_level: ActivityLevel::Low,
        }
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let rec = recommend(&sample(150.0, 85.0, 38.0));
        assert_eq!(
            rec.advisories,
            vec![Advisory::HighHeartRate, Advisory::LowBloodOxygen, Advisory::Fever]
        );
        assert_eq!(
            rec.text,
            format!("{} {} {}", HIGH_HEART_RATE_MSG, LOW_OXYGEN_MSG, FEVER_MSG)
        );
    }

    #[test]
    fn test_normal_vitals() {
        let rec = recommend(&sample(75.0, 97.0, 36.6));
        assert!(rec.is_normal());
        assert_eq!(rec.text, NORMAL_MSG);
    }

    #[test]
    fn test_boundaries_are_strict() {
        assert!(recommend(&sample(100.0, 92.0, 37.5)).is_normal());
        assert_eq!(recommend(&sample(100.1, 92.0, 37.5)).advisories, vec![Advisory::HighHeartRate]);
        assert_eq!(recommend(&sample(80.0, 91.9, 37.5)).advisories, vec![Advisory::LowBloodOxygen]);
        assert_eq!(recommend(&sample(80.0, 95.0, 37.6)).advisories, vec![Advisory::Fever]);
    }

    #[test]
    fn test_idempotent() {
        let s = sample(120.0, 97.0, 38.2);
        assert_eq!(recommend(&s), recommend(&s));
    }

    #[test]
    fn test_nan_reading_defaults_to_normal() {
        let rec = recommend(&sample(f64::NAN, f64::NAN, f64::NAN));
        assert_eq!(rec.text, NORMAL_MSG);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = ClinicalThresholds { heart_rate_max: 90.0, ..Default::default() };
        let rec = recommend_with_thresholds(&sample(95.0, 97.0, 36.6), &strict);
        assert_eq!(rec.advisories, vec![Advisory::HighHeartRate]);
    }

    #[test]
    fn test_batch_recommendations() {
        let texts = generate_recommendations(&[sample(75.0, 97.0, 36.6), sample(75.0, 97.0, 38.0)]);
        assert_eq!(texts, vec![NORMAL_MSG.to_string(), FEVER_MSG.to_string()]);
    }
}
