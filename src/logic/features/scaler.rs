//! Standard Scaler - batch normalization of raw vitals
//!
//! Fit per-feature mean and population standard deviation over a batch, then
//! map every sample to `(x - mean) / std`.
//!
//! Scaling is batch-relative: the same raw reading normalizes differently in
//! different batches. Keep the fitted `Scaler` and call `transform` when values
//! must stay comparable across batches.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, validate_layout, FEATURE_COUNT, FEATURE_VERSION};
use super::sample::VitalSample;
use super::vector::FeatureVector;
use crate::logic::error::{HealthError, HealthResult};

/// Fitted scaling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub mean: [f64; FEATURE_COUNT],
    /// Population std; 0.0 marks a constant feature
    pub std: [f64; FEATURE_COUNT],
    pub n_samples: usize,
}

/// Normalizer output: one vector per input sample plus the fitted scaler
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub vectors: Vec<FeatureVector>,
    pub scaler: Scaler,
}

/// Raw feature matrix (rows = samples, cols = `FEATURE_LAYOUT`)
pub fn raw_matrix(samples: &[VitalSample]) -> Array2<f64> {
    let rows: Vec<[f64; FEATURE_COUNT]> = samples.iter().map(VitalSample::raw_features).collect();
    Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(i, j)| rows[i][j])
}

fn check_batch(samples: &[VitalSample]) -> HealthResult<()> {
    if samples.is_empty() {
        return Err(HealthError::InsufficientData { required: 1, actual: 0 });
    }
    for sample in samples {
        sample.validate()?;
    }
    Ok(())
}

impl Scaler {
    /// Fit scaling parameters over a batch
    pub fn fit(samples: &[VitalSample]) -> HealthResult<Self> {
        check_batch(samples)?;
        Ok(Self::fit_matrix(&raw_matrix(samples)))
    }

    fn fit_matrix(matrix: &Array2<f64>) -> Self {
        let mut mean = [0.0; FEATURE_COUNT];
        let mut std = [0.0; FEATURE_COUNT];

        for (j, column) in matrix.axis_iter(Axis(1)).enumerate() {
            let first = column[0];
            if column.iter().all(|&v| v == first) {
                // Constant feature: fixed zero std, transform maps it to 0
                mean[j] = first;
                std[j] = 0.0;
                continue;
            }
            mean[j] = column.mean().unwrap_or(0.0);
            std[j] = column.std(0.0);
        }

        Self {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            mean,
            std,
            n_samples: matrix.nrows(),
        }
    }

    /// Scale one raw row
    pub fn scale_row(&self, raw: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            out[j] = if self.std[j] > 0.0 {
                (raw[j] - self.mean[j]) / self.std[j]
            } else {
                0.0
            };
        }
        out
    }

    /// Apply previously fitted parameters to a (possibly different) batch
    pub fn transform(&self, samples: &[VitalSample]) -> HealthResult<Vec<FeatureVector>> {
        check_batch(samples)?;
        validate_layout(self.feature_version, self.layout_hash)
            .map_err(|e| HealthError::validation(e.to_string()))?;

        Ok(samples
            .iter()
            .map(|s| FeatureVector::from_values(self.scale_row(&s.raw_features())))
            .collect())
    }

    /// Feature names whose std was zero in the fitted batch
    pub fn constant_features(&self) -> Vec<&'static str> {
        (0..FEATURE_COUNT)
            .filter(|&j| self.std[j] == 0.0)
            .filter_map(super::layout::feature_name)
            .collect()
    }
}

/// Feature Normalizer: fit a scaler over the batch and transform it
pub fn normalize(samples: &[VitalSample]) -> HealthResult<NormalizedBatch> {
    let scaler = Scaler::fit(samples)?;
    let vectors = scaler.transform(samples)?;

    let constant = scaler.constant_features();
    if !constant.is_empty() {
        log::debug!("Constant features in batch of {}: {:?}", samples.len(), constant);
    }

    Ok(NormalizedBatch { vectors, scaler })
}

/// Stack vectors into a matrix for the scorer
pub fn to_matrix(vectors: &[FeatureVector]) -> Array2<f64> {
    Array2::from_shape_fn((vectors.len(), FEATURE_COUNT), |(i, j)| vectors[i].values[j])
}
