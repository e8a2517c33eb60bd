//! Model Evaluation - classification report for scorer verdicts
//!
//! Compares predicted verdicts with ground-truth labels (e.g. injected
//! anomalies). Divisions by zero yield 0.

use serde::{Deserialize, Serialize};

use crate::logic::error::{HealthError, HealthResult};
use crate::logic::model::AnomalyVerdict;

/// Metrics for one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: AnomalyVerdict,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Averaged metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    pub fn class(&self, label: AnomalyVerdict) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

pub fn classification_report(
    y_true: &[AnomalyVerdict],
    y_pred: &[AnomalyVerdict],
) -> HealthResult<ClassificationReport> {
    if y_true.len() != y_pred.len() {
        return Err(HealthError::validation(format!(
            "label count mismatch: {} true vs {} predicted",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(HealthError::InsufficientData { required: 1, actual: 0 });
    }

    let total = y_true.len();
    let pairs = || y_true.iter().zip(y_pred.iter());

    let classes: Vec<ClassMetrics> = [AnomalyVerdict::Normal, AnomalyVerdict::Anomaly]
        .into_iter()
        .map(|label| {
            let tp = pairs().filter(|(t, p)| **t == label && **p == label).count();
            let predicted = pairs().filter(|(_, p)| **p == label).count();
            let support = pairs().filter(|(t, _)| **t == label).count();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            ClassMetrics { label, precision, recall, f1_score: f1(precision, recall), support }
        })
        .collect();

    let correct = pairs().filter(|(t, p)| t == p).count();
    let n_classes = classes.len() as f64;

    let macro_avg = AverageMetrics {
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
        f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / n_classes,
        support: total,
    };

    let weighted = |metric: fn(&ClassMetrics) -> f64| {
        classes.iter().map(|c| metric(c) * c.support as f64).sum::<f64>() / total as f64
    };
    let weighted_avg = AverageMetrics {
        precision: weighted(|c: &ClassMetrics| c.precision),
        recall: weighted(|c: &ClassMetrics| c.recall),
        f1_score: weighted(|c: &ClassMetrics| c.f1_score),
        support: total,
    };

    Ok(ClassificationReport {
        accuracy: ratio(correct, total),
        classes,
        macro_avg,
        weighted_avg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::AnomalyVerdict::{Anomaly as A, Normal as N};

    #[test]
    fn test_hand_computed_report() {
        let y_true = [N, N, N, N, N, N, A, A, A, A];
        let y_pred = [N, N, N, N, N, A, A, A, N, N];
        let report = classification_report(&y_true, &y_pred).unwrap();

        let normal = report.class(N).unwrap();
        assert!((normal.precision - 5.0 / 7.0).abs() < 1e-12);
        assert!((normal.recall - 5.0 / 6.0).abs() < 1e-12);
        assert_eq!(normal.support, 6);

        let anomaly = report.class(A).unwrap();
        assert!((anomaly.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((anomaly.recall - 0.5).abs() < 1e-12);
        assert!((anomaly.f1_score - 4.0 / 7.0).abs() < 1e-12);

        assert!((report.accuracy - 0.7).abs() < 1e-12);
        assert_eq!(report.macro_avg.support, 10);
        let expected_weighted_recall = (6.0 * 5.0 / 6.0 + 4.0 * 0.5) / 10.0;
        assert!((report.weighted_avg.recall - expected_weighted_recall).abs() < 1e-12);
    }

    #[test]
    fn test_no_predicted_anomalies() {
        let report = classification_report(&[N, A], &[N, N]).unwrap();
        let anomaly = report.class(A).unwrap();
        assert_eq!(anomaly.precision, 0.0);
        assert_eq!(anomaly.f1_score, 0.0);
    }

    #[test]
    fn test_input_errors() {
        assert!(matches!(classification_report(&[N], &[]), Err(HealthError::Validation(_))));
        assert!(matches!(classification_report(&[], &[]), Err(HealthError::InsufficientData { .. })));
    }
}
