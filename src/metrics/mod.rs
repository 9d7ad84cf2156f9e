//! Regression metrics (R², MSE, MAE, RMSE).

use crate::error::{AqError, Result};
use crate::primitives::Vector;

fn check_lengths(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> Result<()> {
    if y_pred.len() != y_true.len() {
        return Err(AqError::dimension_mismatch(
            "y_true length",
            y_true.len(),
            y_pred.len(),
        ));
    }
    if y_true.is_empty() {
        return Err(AqError::insufficient_data("cannot score zero samples"));
    }
    Ok(())
}

/// Computes the coefficient of determination (R²).
///
/// R² = 1 - (`SS_res` / `SS_tot`)
///
/// A constant target has `SS_tot` = 0; the score is then 1.0 for an exact fit
/// and 0.0 otherwise.
///
/// # Examples
///
/// ```
/// use aqfleet::metrics::r_squared;
/// use aqfleet::primitives::Vector;
///
/// let y_true = Vector::from_slice(&[3.0, -0.5, 2.0, 7.0]);
/// let y_pred = Vector::from_slice(&[2.5, 0.0, 2.0, 8.0]);
/// let r2 = r_squared(&y_pred, &y_true).unwrap();
/// assert!(r2 > 0.9);
/// ```
///
/// # Errors
///
/// Returns an error if the lengths differ or the vectors are empty.
pub fn r_squared(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> Result<f64> {
    check_lengths(y_pred, y_true)?;

    let y_mean = y_true.mean();

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - (ss_res / ss_tot))
}

/// Computes the Mean Squared Error (MSE).
///
/// # Errors
///
/// Returns an error if the lengths differ or the vectors are empty.
pub fn mse(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> Result<f64> {
    check_lengths(y_pred, y_true)?;
    let sum_sq_error: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(sum_sq_error / y_true.len() as f64)
}

/// Computes the Root Mean Squared Error (RMSE).
///
/// # Errors
///
/// Returns an error if the lengths differ or the vectors are empty.
pub fn rmse(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> Result<f64> {
    mse(y_pred, y_true).map(f64::sqrt)
}

/// Computes the Mean Absolute Error (MAE).
///
/// # Errors
///
/// Returns an error if the lengths differ or the vectors are empty.
pub fn mae(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> Result<f64> {
    check_lengths(y_pred, y_true)?;
    let sum_abs: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum();
    Ok(sum_abs / y_true.len() as f64)
}
