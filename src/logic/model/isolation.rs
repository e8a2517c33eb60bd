//! Isolation Forest - random-partition outlier detector
//!
//! Each tree is grown on a random subsample by picking a random feature and a
//! uniform split between that feature's min and max at the node. Points that
//! get isolated after few splits have short paths and score as anomalous.
//!
//! Scores follow the usual convention: `s(x) = 2^(-E[h(x)] / c(ψ))`, where ψ is
//! the subsample size and `c` the average unsuccessful-search path length of a
//! binary search tree. `score_samples` returns `-s` so that lower = more abnormal.

use ndarray::{Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::MIN_SCORING_SAMPLES;
use crate::logic::error::{HealthError, HealthResult};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum Node {
    Leaf { size: usize },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow<R: Rng>(data: &Array2<f64>, indices: Vec<usize>, height_limit: usize, rng: &mut R) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(data, indices, 0, height_limit, rng);
        tree
    }

    fn build<R: Rng>(
        &mut self,
        data: &Array2<f64>,
        indices: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut R,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: indices.len() });

        if depth >= height_limit || indices.len() <= 1 {
            return id;
        }

        // Only features that still vary inside this node can split it
        let candidates: Vec<(usize, f64, f64)> = (0..data.ncols())
            .filter_map(|j| {
                let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                    let v = data[[i, j]];
                    (lo.min(v), hi.max(v))
                });
                (hi > lo).then_some((j, lo, hi))
            })
            .collect();

        if candidates.is_empty() {
            return id;
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = lo + rng.gen::<f64>() * (hi - lo);

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
            indices.into_iter().partition(|&i| data[[i, feature]] <= threshold);

        let left = self.build(data, left_idx, depth + 1, height_limit, rng);
        let right = self.build(data, right_idx, depth + 1, height_limit, rng);
        self.nodes[id] = Node::Split { feature, threshold, left, right };
        id
    }

    fn path_length(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes[node] {
                Node::Leaf { size } => return depth + average_path_length(size),
                Node::Split { feature, threshold, left, right } => {
                    node = if row[feature] <= threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Forest construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub seed: u64,
}

/// Fitted isolation forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    n_features: usize,
}

impl IsolationForest {
    pub fn fit(data: &Array2<f64>, params: &ForestParams) -> HealthResult<Self> {
        let n = data.nrows();
        if n < MIN_SCORING_SAMPLES {
            return Err(HealthError::InsufficientData { required: MIN_SCORING_SAMPLES, actual: n });
        }
        if params.n_estimators == 0 {
            return Err(HealthError::validation("n_estimators must be at least 1"));
        }
        if params.max_samples < MIN_SCORING_SAMPLES {
            return Err(HealthError::validation(format!(
                "max_samples must be at least {}",
                MIN_SCORING_SAMPLES
            )));
        }

        let sample_size = params.max_samples.min(n);
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let subsample = index::sample(&mut rng, n, sample_size).into_vec();
                IsolationTree::grow(data, subsample, height_limit, &mut rng)
            })
            .collect();

        log::debug!(
            "Isolation forest fitted: {} trees, subsample={}, height_limit={}, n={}",
            params.n_estimators,
            sample_size,
            height_limit,
            n
        );

        Ok(Self { trees, sample_size, n_features: data.ncols() })
    }

    /// Mean path length across trees
    pub fn mean_path_length(&self, row: ArrayView1<f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(row)).sum();
        total / self.trees.len() as f64
    }

    /// Anomaly score in (0, 1]; close to 1 = isolated quickly
    pub fn anomaly_score(&self, row: ArrayView1<f64>) -> f64 {
        let norm = average_path_length(self.sample_size);
        2f64.powf(-self.mean_path_length(row) / norm)
    }

    /// Inlier scores (`-s`), lower = more abnormal
    pub fn score_samples(&self, data: &Array2<f64>) -> HealthResult<Vec<f64>> {
        if data.ncols() != self.n_features {
            return Err(HealthError::validation(format!(
                "expected {} features, got {}",
                self.n_features,
                data.ncols()
            )));
        }
        Ok(data.axis_iter(Axis(0)).map(|row| -self.anomaly_score(row)).collect())
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed: u64) -> ForestParams {
        ForestParams { n_estimators: 100, max_samples: 256, seed }
    }

    fn cluster_with_outlier() -> Array2<f64> {
        let mut data = Array2::from_shape_fn((64, 2), |(i, j)| ((i * 7 + j * 3) % 11) as f64 * 0.1);
        data[[63, 0]] = 25.0;
        data[[63, 1]] = -25.0;
        data
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!((average_path_length(256) - 10.2448).abs() < 1e-3);
    }

    #[test]
    fn test_outlier_scores_lowest() {
        let data = cluster_with_outlier();
        let forest = IsolationForest::fit(&data, &params(7)).unwrap();
        let scores = forest.score_samples(&data).unwrap();

        let (argmin, _) = scores
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |(bi, bv), (i, &v)| if v < bv { (i, v) } else { (bi, bv) });
        assert_eq!(argmin, 63);
        assert!(scores.iter().all(|s| *s < 0.0 && *s >= -1.0));
    }

    #[test]
    fn test_same_seed_same_scores() {
        let data = cluster_with_outlier();
        let a = IsolationForest::fit(&data, &params(3)).unwrap().score_samples(&data).unwrap();
        let b = IsolationForest::fit(&data, &params(3)).unwrap().score_samples(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_rows() {
        let data = Array2::zeros((1, 5));
        assert!(matches!(
            IsolationForest::fit(&data, &params(1)),
            Err(HealthError::InsufficientData { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_subsample_capped_by_batch() {
        let data = cluster_with_outlier();
        let forest = IsolationForest::fit(&data, &params(1)).unwrap();
        assert_eq!(forest.sample_size(), 64);
        assert_eq!(forest.n_estimators(), 100);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let forest = IsolationForest::fit(&cluster_with_outlier(), &params(1)).unwrap();
        assert!(forest.score_samples(&Array2::zeros((3, 5))).is_err());
    }
}
