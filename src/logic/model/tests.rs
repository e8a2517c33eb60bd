//! Scorer tests: determinism, proportionality, failure modes

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::logic::error::HealthError;
use crate::logic::features::{normalize, ActivityLevel, FeatureVector, VitalSample};
use super::{detect_anomalies, AnomalyDetector, AnomalyVerdict, ScoringConfig};

fn batch(n: usize, seed: u64) -> Vec<VitalSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let hr: Normal<f64> = Normal::new(75.0, 3.0).unwrap();
    let spo2: Normal<f64> = Normal::new(96.0, 1.0).unwrap();
    let temp: Normal<f64> = Normal::new(36.6, 0.2).unwrap();
    let rr: Normal<f64> = Normal::new(15.0, 1.0).unwrap();
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

    (0..n)
        .map(|i| VitalSample {
            subject_id: "user_1".to_string(),
            timestamp: start + Duration::minutes(i as i64),
            heart_rate: hr.sample(&mut rng),
            blood_oxygen: spo2.sample(&mut rng).min(100.0),
            temperature: temp.sample(&mut rng),
            respiration_rate: rr.sample(&mut rng),
            activity_level: ActivityLevel::ALL[rng.gen_range(0..3)],
        })
        .collect()
}

fn vectors(n: usize, seed: u64) -> Vec<FeatureVector> {
    normalize(&batch(n, seed)).unwrap().vectors
}

#[test]
fn test_same_seed_same_verdicts() {
    let vs = vectors(200, 11);
    let a = detect_anomalies(&vs, 0.05, 42).unwrap();
    let b = detect_anomalies(&vs, 0.05, 42).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_proportional_to_contamination() {
    let vs = vectors(100, 5);
    let verdicts = detect_anomalies(&vs, 0.05, 42).unwrap();
    assert_eq!(verdicts.len(), 100);

    let flagged = verdicts.iter().filter(|v| v.is_anomaly()).count();
    assert!((1..=10).contains(&flagged), "flagged {}", flagged);
}

#[test]
fn test_extreme_reading_is_flagged() {
    let mut samples = batch(150, 9);
    samples[40].heart_rate = 160.0;
    samples[40].blood_oxygen = 80.0;
    samples[40].temperature = 39.5;
    samples[40].respiration_rate = 30.0;

    let vs = normalize(&samples).unwrap().vectors;
    let scored = AnomalyDetector::fit(&vs, &ScoringConfig::new(0.05, 42)).unwrap();

    assert_eq!(scored.verdicts[40], AnomalyVerdict::Anomaly);
    let min_idx = scored
        .scores
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i);
    assert_eq!(min_idx, Some(40));
}

#[test]
fn test_insufficient_data() {
    let vs = vectors(1, 1);
    assert!(matches!(
        detect_anomalies(&vs, 0.05, 42),
        Err(HealthError::InsufficientData { required: 2, actual: 1 })
    ));
    assert!(matches!(
        detect_anomalies(&[], 0.05, 42),
        Err(HealthError::InsufficientData { actual: 0, .. })
    ));
}

#[test]
fn test_invalid_contamination() {
    let vs = vectors(20, 1);
    assert!(matches!(detect_anomalies(&vs, 0.0, 42), Err(HealthError::Validation(_))));
    assert!(matches!(detect_anomalies(&vs, 0.6, 42), Err(HealthError::Validation(_))));
}

#[test]
fn test_constant_batch_has_no_anomalies() {
    let vs = vec![FeatureVector::new(); 30];
    let verdicts = detect_anomalies(&vs, 0.1, 42).unwrap();
    assert!(verdicts.iter().all(|v| *v == AnomalyVerdict::Normal));
}

#[test]
fn test_detector_reused_on_new_batch() {
    let vs = vectors(120, 3);
    let scored = AnomalyDetector::fit(&vs, &ScoringConfig::new(0.05, 42)).unwrap();

    // Re-labelling the training batch reproduces the fit-time verdicts
    let again = scored.detector.predict(&vs).unwrap();
    assert_eq!(again, scored.verdicts);
    assert_eq!(scored.anomaly_count(), scored.stats.flagged);

    let far = FeatureVector::from_values([8.0, -8.0, 8.0, 8.0, 8.0]);
    assert_eq!(scored.detector.predict(&[far]).unwrap(), vec![AnomalyVerdict::Anomaly]);
}
