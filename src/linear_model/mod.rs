//! Linear models for regression.
//!
//! Includes Ordinary Least Squares (OLS), Ridge (L2) and Lasso (L1).

mod lasso;
mod ridge;

pub use lasso::Lasso;
pub use ridge::Ridge;

use crate::error::{AqError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Checks that `x` and `y` agree on the sample count and are non-empty.
pub(crate) fn validate_training_data(x: &Matrix<f64>, y: &Vector<f64>) -> Result<()> {
    let n_samples = x.n_rows();
    if n_samples != y.len() {
        return Err(AqError::dimension_mismatch("target length", n_samples, y.len()));
    }
    if n_samples == 0 {
        return Err(AqError::insufficient_data("cannot fit with zero samples"));
    }
    Ok(())
}

/// Shared prediction path for fitted linear models: `x · β + intercept`.
pub(crate) fn linear_predict(
    x: &Matrix<f64>,
    coefficients: Option<&Vector<f64>>,
    intercept: f64,
) -> Result<Vector<f64>> {
    let coefficients = coefficients.ok_or(AqError::NotFitted)?;
    Ok(x.matvec(coefficients)?.add_scalar(intercept))
}

/// Solves `(XᵀX + αI) β = Xᵀy` and returns `(β, intercept)`.
///
/// With an intercept, columns and target are centered first: the intercept
/// is then unpenalized and the solve does not mix a unit column with
/// large-magnitude features.
pub(crate) fn solve_normal_equations(
    x: &Matrix<f64>,
    y: &Vector<f64>,
    alpha: f64,
    fit_intercept: bool,
) -> Result<(Vector<f64>, f64)> {
    let (n_samples, n_features) = x.shape();
    let (x_means, y_mean) = if fit_intercept {
        (x.column_means(), y.mean())
    } else {
        (vec![0.0; n_features], 0.0)
    };

    let mut centered = Vec::with_capacity(n_samples * n_features);
    for i in 0..n_samples {
        centered.extend(x.row_slice(i).iter().zip(&x_means).map(|(v, m)| v - m));
    }
    let xc = Matrix::from_vec(n_samples, n_features, centered)?;
    let yc = y.add_scalar(-y_mean);

    let xt = xc.transpose();
    let mut xtx = xt.matmul(&xc)?;
    if alpha > 0.0 {
        for j in 0..n_features {
            let current = xtx.get(j, j);
            xtx.set(j, j, current + alpha);
        }
    }
    let xty = xt.matvec(&yc)?;
    let beta = xtx.cholesky_solve(&xty)?;

    let intercept = y_mean - beta.dot(&Vector::from_vec(x_means));
    Ok((beta, intercept))
}

/// Ordinary Least Squares (OLS) linear regression.
///
/// Fits a linear model by minimizing the residual sum of squares between
/// observed targets and predicted targets:
///
/// ```text
/// y = X β + ε
/// ```
///
/// # Solver
///
/// Uses normal equations: `β = (X^T X)^-1 X^T y` via Cholesky decomposition,
/// on centered data when an intercept is fitted.
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
///
/// let coef = model.coefficients().unwrap();
/// assert!((coef[0] - 2.0).abs() < 1e-9);
/// assert!((model.intercept() - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Coefficients for features (excluding intercept).
    coefficients: Option<Vector<f64>>,
    /// Intercept (bias) term.
    intercept: f64,
    /// Whether to fit an intercept.
    fit_intercept: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Creates a new `LinearRegression` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            fit_intercept: true,
        }
    }

    /// Sets whether to fit an intercept term.
    #[must_use]
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
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
}

impl Estimator for LinearRegression {
    /// Fits the linear regression model using normal equations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Input dimensions don't match
    /// - Not enough samples for the number of features (underdetermined system)
    /// - The normal equations are singular (collinear columns)
    ///
    /// All-zero columns (an indicator with no remaining rows) carry no
    /// information; they are left out of the solve and get coefficient 0,
    /// the minimum-norm least-squares answer.
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()> {
        validate_training_data(x, y)?;
        let (n_samples, n_features) = x.shape();

        let active: Vec<usize> = (0..n_features)
            .filter(|&j| (0..n_samples).any(|i| x.get(i, j) != 0.0))
            .collect();
        if active.len() < n_features {
            debug!(
                dropped = n_features - active.len(),
                "all-zero columns excluded from OLS solve"
            );
        }
        let n_active = active.len();

        // With an intercept we need n_samples >= n_active + 1
        let required_samples = if self.fit_intercept {
            n_active + 1
        } else {
            n_active
        };

        if n_samples < required_samples {
            return Err(AqError::insufficient_data(format!(
                "OLS needs at least {required_samples} samples for {n_active} features, \
                 got {n_samples}"
            )));
        }

        let x_active = x.select_columns(&active);
        let (beta, intercept) = solve_normal_equations(&x_active, y, 0.0, self.fit_intercept)?;
        self.intercept = intercept;

        let mut coefficients = Vector::zeros(n_features);
        for (k, &j) in active.iter().enumerate() {
            coefficients[j] = beta[k];
        }
        self.coefficients = Some(coefficients);

        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>> {
        linear_predict(x, self.coefficients.as_ref(), self.intercept)
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
