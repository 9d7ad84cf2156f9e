//! Ridge regression (L2-penalized least squares).

use super::{linear_predict, solve_normal_equations, validate_training_data};
use crate::error::{AqError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use serde::{Deserialize, Serialize};

/// Ridge regression with L2 regularization.
///
/// ```text
/// minimize ||y - Xβ||² + α||β||²
/// ```
///
/// The intercept is not penalized.
///
/// # Examples
///
/// ```
/// use aqfleet::prelude::*;
/// use aqfleet::linear_model::Ridge;
///
/// let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let y = Vector::from_slice(&[3.0, 5.0, 7.0, 9.0, 11.0]);
///
/// let mut model = Ridge::new(1.0);
/// model.fit(&x, &y).unwrap();
/// assert!(model.score(&x, &y).unwrap() > 0.95);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ridge {
    /// Regularization strength.
    alpha: f64,
    /// Coefficients for features (excluding intercept).
    coefficients: Option<Vector<f64>>,
    /// Intercept (bias) term.
    intercept: f64,
    /// Whether to fit an intercept.
    fit_intercept: bool,
}

impl Ridge {
    /// Creates a new `Ridge` regression with the given regularization strength.
    ///
    /// `alpha` must be non-negative; 0.0 is equivalent to OLS.
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
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
}

impl Estimator for Ridge {
    /// Fits the Ridge regression model using regularized normal equations.
    ///
    /// Solves: β = (X^T X + αI)^-1 X^T y, with the intercept recovered from
    /// the column means so it is never penalized.
    ///
    /// # Errors
    ///
    /// Returns an error if alpha is negative, input dimensions don't match,
    /// or the system is singular.
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()> {
        if !(self.alpha >= 0.0) {
            return Err(AqError::InvalidHyperparameter {
                param: "alpha".to_string(),
                value: self.alpha.to_string(),
                constraint: ">= 0".to_string(),
            });
        }
        validate_training_data(x, y)?;

        let (beta, intercept) = solve_normal_equations(x, y, self.alpha, self.fit_intercept)?;
        self.intercept = intercept;
        self.coefficients = Some(beta);

        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>> {
        linear_predict(x, self.coefficients.as_ref(), self.intercept)
    }
}
