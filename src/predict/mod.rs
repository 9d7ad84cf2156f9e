//! Point and curve predictions from a fitted model.
//!
//! Feature rows are built through [`ColumnOrder`], the same path training
//! uses. Outputs are concentrations, so every prediction is clipped at 0.

use crate::error::Result;
use crate::features::{ColumnOrder, CountrySelection, DesignMatrix};
use crate::model::FittedModel;
use crate::primitives::Matrix;
use crate::traits::Estimator;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of curve samples.
pub const DEFAULT_CURVE_SAMPLES: usize = 100;

/// One (input, prediction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Primary feature value.
    pub x: f64,
    /// Clipped prediction.
    pub y: f64,
}

/// One observed training row: primary feature and target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedPoint {
    /// Primary feature value.
    pub x: f64,
    /// Observed target value.
    pub y: f64,
}

/// `n` evenly spaced values over `[min, max]`, both ends included.
///
/// `n == 1` yields `[min]`; `n == 0` yields nothing.
#[must_use]
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { max } else { min + step * i as f64 })
                .collect()
        }
    }
}

fn clip(value: f64) -> f64 {
    value.max(0.0)
}

/// Predicts one clipped value.
///
/// `additional` holds one value per additional feature in column order
/// (use the training means by default; see [`DesignMatrix::additional_means`]).
///
/// # Errors
///
/// - `UnknownCategory` if the selected country is not encoded
/// - `DimensionMismatch` if `additional` has the wrong length
pub fn predict_point(
    model: &FittedModel,
    column_order: &ColumnOrder,
    primary_value: f64,
    additional: &[f64],
    selection: &CountrySelection,
) -> Result<f64> {
    let row = column_order.build_row(primary_value, additional, selection)?;
    let x = Matrix::from_vec(1, row.len(), row)?;
    let raw = model.predict(&x)?[0];
    debug!(primary_value, raw, "point prediction");
    Ok(clip(raw))
}

/// Predicts `n_samples` clipped values over `[min, max]` of the primary
/// feature.
///
/// # Errors
///
/// As for [`predict_point`].
pub fn predict_curve(
    model: &FittedModel,
    column_order: &ColumnOrder,
    min: f64,
    max: f64,
    n_samples: usize,
    additional: &[f64],
    selection: &CountrySelection,
) -> Result<Vec<CurvePoint>> {
    let xs = linspace(min, max, n_samples);
    if xs.is_empty() {
        return Ok(Vec::new());
    }

    let mut data = Vec::with_capacity(xs.len() * column_order.len());
    for &x in &xs {
        data.extend(column_order.build_row(x, additional, selection)?);
    }
    let rows = Matrix::from_vec(xs.len(), column_order.len(), data)?;
    let ys = model.predict(&rows)?;

    Ok(xs
        .into_iter()
        .zip(ys.iter())
        .map(|(x, y)| CurvePoint { x, y: clip(y) })
        .collect())
}

/// Training rows of the selected country as (primary, target) pairs.
///
/// # Errors
///
/// `UnknownCategory` if the selected country is not encoded.
pub fn observed_points(
    design: &DesignMatrix,
    selection: &CountrySelection,
) -> Result<Vec<ObservedPoint>> {
    let wanted = design.column_order.encoding().code_for(selection)?;

    Ok(design
        .training_countries()
        .into_iter()
        .enumerate()
        .filter(|(_, country)| *country == wanted)
        .map(|(i, _)| ObservedPoint {
            x: design.x.get(i, 0),
            y: design.y[i],
        })
        .collect())
}
