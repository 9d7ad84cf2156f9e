//! Helper functions for regression tree building.
//!
//! Trees are grown over index lists into the caller's matrix instead of
//! copying row subsets at every level.

use super::{RegressionLeaf, RegressionNode, RegressionTreeNode};
use crate::primitives::Matrix;

/// Stopping rules shared by every node of one tree.
pub(super) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

/// Best split found for a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Split {
    pub feature_idx: usize,
    pub threshold: f64,
    pub gain: f64,
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

/// Population variance of the targets named by `indices`.
pub(super) fn variance_of(y: &[f64], indices: &[usize]) -> f64 {
    if indices.len() <= 1 {
        return 0.0;
    }
    let mean = mean_of(y, indices);
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>() / indices.len() as f64
}

/// Sum of squared errors around the mean from running sums.
fn sse(sum: f64, sum_sq: f64, n: f64) -> f64 {
    (sum_sq - sum * sum / n).max(0.0)
}

/// Best MSE-reducing threshold for one feature.
///
/// Candidate thresholds are midpoints between consecutive distinct values.
/// Returns `(threshold, gain)` with the earliest threshold winning ties.
pub(super) fn best_split_for_feature(
    x: &Matrix<f64>,
    y: &[f64],
    indices: &[usize],
    feature_idx: usize,
    current_variance: f64,
    min_samples_leaf: usize,
) -> Option<(f64, f64)> {
    let n = indices.len();
    let mut order: Vec<(f64, f64)> = indices
        .iter()
        .map(|&i| (x.get(i, feature_idx), y[i]))
        .collect();
    order.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total_sum: f64 = order.iter().map(|(_, t)| t).sum();
    let total_sq: f64 = order.iter().map(|(_, t)| t * t).sum();

    let mut left_sum = 0.0;
    let mut left_sq = 0.0;
    let mut best: Option<(f64, f64)> = None;

    for k in 0..n.saturating_sub(1) {
        let (value, target) = order[k];
        left_sum += target;
        left_sq += target * target;

        let next_value = order[k + 1].0;
        if next_value <= value {
            continue;
        }

        let n_left = k + 1;
        let n_right = n - n_left;
        if n_left < min_samples_leaf || n_right < min_samples_leaf {
            continue;
        }

        let split_mse = (sse(left_sum, left_sq, n_left as f64)
            + sse(total_sum - left_sum, total_sq - left_sq, n_right as f64))
            / n as f64;
        let gain = current_variance - split_mse;

        if gain > 1e-12 && best.map_or(true, |(_, g)| gain > g) {
            best = Some(((value + next_value) / 2.0, gain));
        }
    }

    best
}

/// Best split across all features; lower feature index wins ties.
pub(super) fn find_best_split(
    x: &Matrix<f64>,
    y: &[f64],
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<Split> {
    if indices.len() < 2 {
        return None;
    }

    let current_variance = variance_of(y, indices);
    let mut best: Option<Split> = None;

    for feature_idx in 0..x.n_cols() {
        if let Some((threshold, gain)) = best_split_for_feature(
            x,
            y,
            indices,
            feature_idx,
            current_variance,
            min_samples_leaf,
        ) {
            if best.map_or(true, |b| gain > b.gain) {
                best = Some(Split {
                    feature_idx,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}

fn make_leaf(y: &[f64], indices: &[usize]) -> RegressionTreeNode {
    RegressionTreeNode::Leaf(RegressionLeaf {
        value: mean_of(y, indices),
        n_samples: indices.len(),
    })
}

fn at_max_depth(depth: usize, max_depth: Option<usize>) -> bool {
    max_depth.is_some_and(|max_d| depth >= max_d)
}

/// Builds a regression tree over the rows named by `indices`.
pub(super) fn build_regression_tree(
    x: &Matrix<f64>,
    y: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: &TreeParams,
) -> RegressionTreeNode {
    if indices.len() < params.min_samples_split
        || at_max_depth(depth, params.max_depth)
        || variance_of(y, &indices) < 1e-10
    {
        return make_leaf(y, &indices);
    }

    let Some(split) = find_best_split(x, y, &indices, params.min_samples_leaf) else {
        return make_leaf(y, &indices);
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x.get(i, split.feature_idx) <= split.threshold);

    RegressionTreeNode::Node(RegressionNode {
        feature_idx: split.feature_idx,
        threshold: split.threshold,
        left: Box::new(build_regression_tree(x, y, left, depth + 1, params)),
        right: Box::new(build_regression_tree(x, y, right, depth + 1, params)),
    })
}

/// Draws `n_samples` row indices with replacement.
///
/// A seed makes the draw reproducible; `None` uses the thread RNG.
pub(super) fn bootstrap_sample(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    use rand::distributions::{Distribution, Uniform};
    use rand::SeedableRng;

    let dist = Uniform::from(0..n_samples);

    match random_state {
        Some(seed) => {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
        }
        None => {
            let mut rng = rand::thread_rng();
            (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
        }
    }
}
