//! Vital Sign Simulator
//!
//! Sample source for demos and tests. Each subject gets its own baseline and
//! one reading per minute drawn around it. Same seed + same start ⇒ same data.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::logic::features::{ActivityLevel, VitalSample};

/// Simulator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub subjects: usize,
    /// Readings per subject, one per minute
    pub minutes: usize,
    pub seed: u64,
    /// First timestamp; `None` = now
    pub start: Option<DateTime<Utc>>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            subjects: 5,
            minutes: 120,
            seed: crate::constants::DEFAULT_SEED,
            start: None,
        }
    }
}

/// Per-subject resting baseline
#[derive(Debug, Clone, Copy)]
struct Baseline {
    heart_rate: f64,
    blood_oxygen: f64,
    temperature: f64,
    respiration_rate: f64,
}

impl Baseline {
    fn draw<R: Rng>(index: usize, rng: &mut R) -> Self {
        let i = index as f64;
        Self {
            heart_rate: rng.gen_range(65..85) as f64 + i * 2.0,
            blood_oxygen: rng.gen_range(93..98) as f64 - i,
            temperature: 36.5 + i * 0.1,
            respiration_rate: rng.gen_range(13..18) as f64,
        }
    }
}

fn gaussian<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // std_dev is a positive constant below, so construction cannot fail
    Normal::new(mean, std_dev).map(|d| d.sample(rng)).unwrap_or(mean)
}

/// Generate `subjects * minutes` samples, grouped by subject
pub fn simulate(config: &SimulationConfig) -> Vec<VitalSample> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let start = config.start.unwrap_or_else(Utc::now);
    let mut data = Vec::with_capacity(config.subjects * config.minutes);

    for idx in 0..config.subjects {
        let subject_id = format!("user_{}", idx + 1);
        let base = Baseline::draw(idx, &mut rng);

        for minute in 0..config.minutes {
            data.push(VitalSample {
                subject_id: subject_id.clone(),
                timestamp: start + Duration::minutes(minute as i64),
                heart_rate: gaussian(&mut rng, base.heart_rate, 3.0).max(0.0),
                blood_oxygen: gaussian(&mut rng, base.blood_oxygen, 1.0).clamp(0.0, 100.0),
                temperature: gaussian(&mut rng, base.temperature, 0.2),
                respiration_rate: gaussian(&mut rng, base.respiration_rate, 1.0).max(0.0),
                activity_level: ActivityLevel::ALL[rng.gen_range(0..ActivityLevel::ALL.len())],
            });
        }
    }

    log::debug!(
        "Simulated {} samples for {} subjects (seed={})",
        data.len(),
        config.subjects,
        config.seed
    );
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            subjects: 3,
            minutes: 20,
            seed,
            start: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_shape_and_ids() {
        let data = simulate(&config(1));
        assert_eq!(data.len(), 60);
        assert_eq!(data[0].subject_id, "user_1");
        assert_eq!(data[59].subject_id, "user_3");
        assert_eq!(data[1].timestamp - data[0].timestamp, Duration::minutes(1));
        assert!(data.iter().all(|s| s.validate().is_ok()));
    }

    #[test]
    fn test_deterministic_for_seed() {
        assert_eq!(simulate(&config(5)), simulate(&config(5)));
        assert_ne!(simulate(&config(5)), simulate(&config(6)));
    }
}
