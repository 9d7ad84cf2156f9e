//! Lasso regression (L1-penalized least squares).

use super::{linear_predict, validate_training_data};
use crate::error::{AqError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lasso regression with L1 regularization.
///
/// ```text
/// minimize (1 / 2n) ||y - Xβ||² + α||β||₁
/// ```
///
/// # Solver
///
/// Cyclic coordinate descent with soft-thresholding on centered data. The
/// intercept is recovered from the column means and is never penalized.
///
/// # Examples
///
/// ```
/// use aqfleet::prelude::*;
/// use aqfleet::linear_model::Lasso;
///
/// let x = Matrix::from_vec(5, 2, vec![
///     1.0, 2.0,
///     2.0, 3.0,
///     3.0, 5.0,
///     4.0, 4.0,
///     5.0, 7.0,
/// ]).unwrap();
/// let y = Vector::from_slice(&[5.0, 8.0, 11.5, 12.0, 17.5]);
///
/// let mut model = Lasso::new(0.1);
/// model.fit(&x, &y).unwrap();
/// assert!(model.score(&x, &y).unwrap() > 0.9);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lasso {
    /// Regularization strength.
    alpha: f64,
    /// Coefficients for features (excluding intercept).
    coefficients: Option<Vector<f64>>,
    /// Intercept (bias) term.
    intercept: f64,
    /// Whether to fit an intercept.
    fit_intercept: bool,
    /// Maximum number of coordinate descent sweeps.
    max_iter: usize,
    /// Convergence tolerance on the largest coefficient change.
    tol: f64,
    /// Sweeps used by the last fit.
    n_iter: usize,
}

impl Lasso {
    /// Creates a new `Lasso` with the given regularization strength.
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            coefficients: None,
            intercept: 0.0,
            fit_intercept: true,
            max_iter: 1000,
            tol: 1e-4,
            n_iter: 0,
        }
    }

    /// Sets whether to fit an intercept term.
    #[must_use]
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Returns the regularization strength (alpha).
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the coefficients (excluding intercept), or `None` before fit.
    #[must_use]
    pub fn coefficients(&self) -> Option<&Vector<f64>> {
        self.coefficients.as_ref()
    }

    /// Returns the intercept term.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Number of coordinate descent sweeps the last fit used.
    #[must_use]
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Soft-thresholding operator: sign(x) * max(|x| - λ, 0).
    pub(crate) fn soft_threshold(x: f64, lambda: f64) -> f64 {
        if x > lambda {
            x - lambda
        } else if x < -lambda {
            x + lambda
        } else {
            0.0
        }
    }

    fn validate_hyperparameters(&self) -> Result<()> {
        if !(self.alpha >= 0.0) {
            return Err(AqError::InvalidHyperparameter {
                param: "alpha".to_string(),
                value: self.alpha.to_string(),
                constraint: ">= 0".to_string(),
            });
        }
        if self.max_iter == 0 {
            return Err(AqError::InvalidHyperparameter {
                param: "max_iter".to_string(),
                value: "0".to_string(),
                constraint: "> 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Estimator for Lasso {
    /// Fits the Lasso model using coordinate descent.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid hyperparameters or mismatched/empty input.
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()> {
        self.validate_hyperparameters()?;
        validate_training_data(x, y)?;
        let (n_samples, n_features) = x.shape();

        let (x_mean, y_mean) = if self.fit_intercept {
            (x.column_means(), y.mean())
        } else {
            (vec![0.0; n_features], 0.0)
        };

        // Column-major centered copy so each coordinate update walks one slice
        let columns: Vec<Vec<f64>> = (0..n_features)
            .map(|j| (0..n_samples).map(|i| x.get(i, j) - x_mean[j]).collect())
            .collect();
        let col_norms_sq: Vec<f64> = columns
            .iter()
            .map(|col| col.iter().map(|v| v * v).sum())
            .collect();

        let mut beta = vec![0.0; n_features];
        let mut residual: Vec<f64> = y.iter().map(|v| v - y_mean).collect();
        let threshold = self.alpha * n_samples as f64;

        let mut converged = false;
        self.n_iter = 0;
        for _ in 0..self.max_iter {
            self.n_iter += 1;
            let mut max_change = 0.0_f64;

            for j in 0..n_features {
                if col_norms_sq[j] < 1e-12 {
                    continue;
                }
                let col = &columns[j];
                let old = beta[j];

                // rho = x_j · (r + x_j β_j)
                let rho: f64 = col
                    .iter()
                    .zip(&residual)
                    .map(|(xij, ri)| xij * (ri + xij * old))
                    .sum();

                let new = Self::soft_threshold(rho, threshold) / col_norms_sq[j];
                let delta = new - old;
                if delta != 0.0 {
                    for (ri, xij) in residual.iter_mut().zip(col) {
                        *ri -= xij * delta;
                    }
                    beta[j] = new;
                }
                max_change = max_change.max(delta.abs());
            }

            if max_change < self.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                max_iter = self.max_iter,
                alpha = self.alpha,
                "lasso coordinate descent did not converge"
            );
        }

        self.intercept = if self.fit_intercept {
            y_mean
                - beta
                    .iter()
                    .zip(&x_mean)
                    .map(|(b, m)| b * m)
                    .sum::<f64>()
        } else {
            0.0
        };
        self.coefficients = Some(Vector::from_vec(beta));
        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>> {
        linear_predict(x, self.coefficients.as_ref(), self.intercept)
    }
}
