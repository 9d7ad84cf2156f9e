//! Core trait for regression estimators.

use crate::error::Result;
use crate::metrics::r_squared;
use crate::primitives::{Matrix, Vector};

/// Supervised regression estimator with sklearn-style fit/predict/score.
///
/// # Examples
///
/// ```
/// use aqfleet::prelude::*;
///
/// // y = 2x + 1
/// let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let y = Vector::from_slice(&[3.0, 5.0, 7.0, 9.0]);
///
/// let mut model = LinearRegression::new();
/// model.fit(&x, &y).unwrap();
/// let score = model.score(&x, &y).unwrap();
/// assert!(score > 0.99);
/// ```
pub trait Estimator {
    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are empty, mismatched, or the solve fails.
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()>;

    /// Predicts target values for input rows.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`, or `DimensionMismatch` if `x` has the
    /// wrong number of columns.
    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>>;

    /// Coefficient of determination of `predict(x)` against `y`.
    ///
    /// When `x`/`y` are the training data this is a training-set R², not a
    /// generalization estimate.
    ///
    /// # Errors
    ///
    /// Propagates `predict` errors, and `DimensionMismatch` if `y` has the
    /// wrong length.
    fn score(&self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        r_squared(&y_pred, y)
    }
}
