//! Decision tree and random forest regressors.
//!
//! CART trees split on the feature/threshold pair with the largest reduction
//! in mean squared error; leaves predict the mean of their training targets.
//!
//! # Example
//!
//! ```
//! use aqfleet::prelude::*;
//! use aqfleet::tree::DecisionTreeRegressor;
//!
//! let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]).unwrap();
//! let y = Vector::from_slice(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0]);
//!
//! let mut tree = DecisionTreeRegressor::new().with_max_depth(1);
//! tree.fit(&x, &y).unwrap();
//! assert_eq!(tree.predict(&x).unwrap().as_slice(), y.as_slice());
//! ```

mod helpers;

use crate::error::{AqError, Result};
use crate::linear_model::validate_training_data;
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use helpers::{bootstrap_sample, build_regression_tree, TreeParams};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Leaf node in a regression tree.
///
/// Contains the predicted value (mean of training samples) and number of
/// training samples that reached this leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionLeaf {
    /// Predicted value for this leaf (mean of y values)
    pub value: f64,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

/// Internal node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionNode {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f64,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<RegressionTreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<RegressionTreeNode>,
}

/// A node in a regression tree (either internal node or leaf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegressionTreeNode {
    /// Internal decision node with split condition
    Node(RegressionNode),
    /// Leaf node with value prediction
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 0,
            RegressionTreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Total training samples that reached this subtree.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(leaf) => leaf.n_samples,
            RegressionTreeNode::Node(node) => node.left.n_samples() + node.right.n_samples(),
        }
    }

    fn predict_one(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                RegressionTreeNode::Leaf(leaf) => return leaf.value,
                RegressionTreeNode::Node(split) => {
                    node = if row[split.feature_idx] <= split.threshold {
                        &split.left
                    } else {
                        &split.right
                    };
                }
            }
        }
    }

    /// Adds sample-count importance for every split into `importances`.
    fn accumulate_importances(&self, importances: &mut [f64]) {
        if let RegressionTreeNode::Node(split) = self {
            importances[split.feature_idx] += self.n_samples() as f64;
            split.left.accumulate_importances(importances);
            split.right.accumulate_importances(importances);
        }
    }
}

/// Decision tree regressor using the CART algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    tree: Option<RegressionTreeNode>,
    n_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    /// Creates a new decision tree regressor with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            n_features: 0,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    /// Sets the maximum depth of the tree.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the minimum number of samples required to split an internal node.
    ///
    /// Values below 2 are clamped to 2.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Sets the minimum number of samples required in a leaf node.
    ///
    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Root of the fitted tree.
    #[must_use]
    pub fn root(&self) -> Option<&RegressionTreeNode> {
        self.tree.as_ref()
    }

    fn params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }

    /// Fits on the rows of `x`/`y` named by `indices` (duplicates allowed).
    fn fit_indices(&mut self, x: &Matrix<f64>, y: &Vector<f64>, indices: Vec<usize>) {
        self.n_features = x.n_cols();
        self.tree = Some(build_regression_tree(x, y.as_slice(), indices, 0, &self.params()));
    }

    fn check_width(&self, x: &Matrix<f64>) -> Result<()> {
        if x.n_cols() != self.n_features {
            return Err(AqError::dimension_mismatch(
                "feature columns",
                self.n_features,
                x.n_cols(),
            ));
        }
        Ok(())
    }
}

impl Estimator for DecisionTreeRegressor {
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()> {
        validate_training_data(x, y)?;
        self.fit_indices(x, y, (0..x.n_rows()).collect());
        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>> {
        let tree = self.tree.as_ref().ok_or(AqError::NotFitted)?;
        self.check_width(x)?;
        Ok((0..x.n_rows())
            .map(|i| tree.predict_one(x.row_slice(i)))
            .collect::<Vec<_>>()
            .into())
    }
}

/// Random forest regressor: an average over bootstrap-trained CART trees.
///
/// Tree `i` draws its bootstrap sample from a generator seeded with
/// `random_state + i`, so a fixed `random_state` gives identical forests
/// for identical inputs.
///
/// # Examples
///
/// ```
/// use aqfleet::prelude::*;
/// use aqfleet::tree::RandomForestRegressor;
///
/// let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let y = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0, 10.0]);
///
/// let mut rf = RandomForestRegressor::new(10).with_random_state(42);
/// rf.fit(&x, &y).unwrap();
/// assert_eq!(rf.predict(&x).unwrap().len(), 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTreeRegressor>,
    n_estimators: usize,
    max_depth: Option<usize>,
    random_state: Option<u64>,
    n_features: usize,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForestRegressor {
    /// Creates a new random forest with `n_estimators` trees.
    #[must_use]
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            random_state: None,
            n_features: 0,
        }
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the random state for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Number of trees requested.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Fitted trees (empty before fit).
    #[must_use]
    pub fn trees(&self) -> &[DecisionTreeRegressor] {
        &self.trees
    }

    /// Sample-count feature importances normalized to sum to 1.0.
    ///
    /// Returns `None` before fit. All zeros if no tree made a split.
    #[must_use]
    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        if self.trees.is_empty() {
            return None;
        }

        let mut totals = vec![0.0; self.n_features];
        for root in self.trees.iter().filter_map(DecisionTreeRegressor::root) {
            root.accumulate_importances(&mut totals);
        }

        let total: f64 = totals.iter().sum();
        if total > 0.0 {
            for importance in &mut totals {
                *importance /= total;
            }
        }
        Some(totals)
    }
}

impl Estimator for RandomForestRegressor {
    /// Fits every tree on its own bootstrap sample.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_estimators` is zero or the inputs are empty or
    /// mismatched.
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(AqError::InvalidHyperparameter {
                param: "n_estimators".to_string(),
                value: "0".to_string(),
                constraint: "> 0".to_string(),
            });
        }
        validate_training_data(x, y)?;
        let n_samples = x.n_rows();

        self.n_features = x.n_cols();
        self.trees = Vec::with_capacity(self.n_estimators);

        for i in 0..self.n_estimators {
            let seed = self.random_state.map(|s| s.wrapping_add(i as u64));
            let indices = bootstrap_sample(n_samples, seed);

            let mut tree = DecisionTreeRegressor::new();
            tree.max_depth = self.max_depth;
            tree.fit_indices(x, y, indices);
            self.trees.push(tree);
        }

        debug!(
            n_estimators = self.n_estimators,
            n_samples,
            n_features = self.n_features,
            "random forest fitted"
        );
        Ok(())
    }

    /// Averages the predictions of all trees.
    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>> {
        if self.trees.is_empty() {
            return Err(AqError::NotFitted);
        }
        if x.n_cols() != self.n_features {
            return Err(AqError::dimension_mismatch(
                "feature columns",
                self.n_features,
                x.n_cols(),
            ));
        }

        let mut predictions = vec![0.0; x.n_rows()];
        for tree in &self.trees {
            for (acc, p) in predictions.iter_mut().zip(tree.predict(x)?.iter()) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in &mut predictions {
            *p /= n_trees;
        }
        Ok(Vector::from_vec(predictions))
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
