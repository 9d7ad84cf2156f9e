//! Design-matrix construction with country fixed effects.
//!
//! One request selects a pollutant, a target column, the primary feature
//! (`AF_fleet`) and optional extra numeric features. Rows are filtered to
//! the pollutant, countries are one-hot encoded against a reference level,
//! and rows with any null input are masked out.

mod encoding;

pub use encoding::{
    ColumnOrder, CountryEncoding, CountrySelection, INDICATOR_PREFIX, PREFERRED_REFERENCE,
};

use crate::data::Table;
use crate::error::{AqError, Result};
use crate::loader::{COUNTRY_COLUMN, POLLUTANT_COLUMN};
use crate::primitives::{Matrix, Vector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default primary feature: alternative-fuel share of the vehicle fleet.
pub const PRIMARY_FEATURE: &str = "AF_fleet";

/// What to model: pollutant, target column and feature columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureRequest {
    /// Value of the `Pollutant` column to keep.
    pub pollutant: String,
    /// Target column, e.g. `AnnualAvg_mean`.
    pub target: String,
    /// Primary feature column.
    pub primary: String,
    /// Extra numeric feature columns.
    pub additional: Vec<String>,
}

impl FeatureRequest {
    /// Request with `AF_fleet` as the only feature.
    #[must_use]
    pub fn new(pollutant: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            pollutant: pollutant.into(),
            target: target.into(),
            primary: PRIMARY_FEATURE.to_string(),
            additional: Vec::new(),
        }
    }

    /// Sets the primary feature column.
    #[must_use]
    pub fn with_primary(mut self, primary: impl Into<String>) -> Self {
        self.primary = primary.into();
        self
    }

    /// Sets the extra feature columns.
    #[must_use]
    pub fn with_additional(mut self, additional: Vec<String>) -> Self {
        self.additional = additional;
        self
    }

    /// Primary followed by additional feature names.
    #[must_use]
    pub fn feature_set(&self) -> Vec<String> {
        let mut names = vec![self.primary.clone()];
        names.extend(self.additional.iter().cloned());
        names
    }
}

/// Observed range of the primary feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
    /// Mean of observed values; the default prediction input.
    pub mean: f64,
}

impl FeatureRange {
    /// Range of the non-null values; `None` if there are none.
    #[must_use]
    pub fn from_values(values: &[Option<f64>]) -> Option<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        let min = present.iter().copied().fold(f64::INFINITY, f64::min);
        let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        Some(Self { min, max, mean })
    }

    /// True if `value` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// A masked design matrix and everything needed to map back to the data.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    /// Masked feature rows in [`ColumnOrder`] order.
    pub x: Matrix<f64>,
    /// Masked target values.
    pub y: Vector<f64>,
    /// One flag per filtered row: true when the row is in `x`/`y`.
    pub mask: Vec<bool>,
    /// Column layout of `x`.
    pub column_order: ColumnOrder,
    /// Country of every filtered row.
    pub countries: Vec<Option<String>>,
    /// Primary feature of every filtered row.
    pub primary_values: Vec<Option<f64>>,
    /// Primary feature range over the filtered rows.
    pub range: FeatureRange,
    /// Mean of each additional feature over the masked rows.
    pub additional_means: Vec<f64>,
}

impl DesignMatrix {
    /// Number of masked (training) rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.x.n_rows()
    }

    /// Number of rows for the pollutant before masking.
    #[must_use]
    pub fn n_filtered(&self) -> usize {
        self.mask.len()
    }

    /// Country of each masked row, aligned with `x`/`y`.
    #[must_use]
    pub fn training_countries(&self) -> Vec<&str> {
        self.mask
            .iter()
            .zip(&self.countries)
            .filter(|(keep, _)| **keep)
            .filter_map(|(_, c)| c.as_deref())
            .collect()
    }
}

/// Builds the design matrix for one request.
///
/// # Errors
///
/// - `MissingColumn` if the pollutant, country, feature or target column
///   is absent
/// - `InsufficientData` if no rows match the pollutant or none survive
///   the mask
pub fn build_design(table: &Table, request: &FeatureRequest) -> Result<DesignMatrix> {
    let required = [
        POLLUTANT_COLUMN,
        COUNTRY_COLUMN,
        request.primary.as_str(),
        request.target.as_str(),
    ];
    for name in required
        .into_iter()
        .chain(request.additional.iter().map(String::as_str))
    {
        table.column(name)?;
    }

    let filtered = table.filter_eq(POLLUTANT_COLUMN, &request.pollutant)?;
    if filtered.n_rows() == 0 {
        return Err(AqError::insufficient_data(format!(
            "no rows for pollutant '{}'",
            request.pollutant
        )));
    }

    let countries = filtered.text(COUNTRY_COLUMN)?;
    let encoding = CountryEncoding::from_codes(countries.iter().flatten()).ok_or_else(|| {
        AqError::insufficient_data(format!(
            "no country codes for pollutant '{}'",
            request.pollutant
        ))
    })?;

    let primary_values = filtered.numeric(&request.primary)?;
    let additional_values = request
        .additional
        .iter()
        .map(|name| filtered.numeric(name))
        .collect::<Result<Vec<_>>>()?;
    let targets = filtered.numeric(&request.target)?;

    let mask: Vec<bool> = (0..filtered.n_rows())
        .map(|i| {
            countries[i].is_some()
                && primary_values[i].is_some()
                && additional_values.iter().all(|col| col[i].is_some())
                && targets[i].is_some()
        })
        .collect();

    let column_order = ColumnOrder::new(
        request.primary.clone(),
        request.additional.clone(),
        encoding,
    );

    let mut data = Vec::new();
    let mut y = Vec::new();
    for i in (0..mask.len()).filter(|&i| mask[i]) {
        let (Some(country), Some(primary), Some(target)) =
            (countries[i].as_ref(), primary_values[i], targets[i])
        else {
            continue;
        };
        let extras: Vec<f64> = additional_values.iter().filter_map(|col| col[i]).collect();
        let selection = CountrySelection::Country(country.clone());
        data.extend(column_order.build_row(primary, &extras, &selection)?);
        y.push(target);
    }

    if y.is_empty() {
        return Err(AqError::insufficient_data(format!(
            "no complete rows for pollutant '{}' and target '{}'",
            request.pollutant, request.target
        )));
    }

    let n_samples = y.len();
    let x = Matrix::from_vec(n_samples, column_order.len(), data)?;

    let additional_means = additional_values
        .iter()
        .map(|col| {
            let kept: Vec<f64> = col
                .iter()
                .zip(&mask)
                .filter(|(_, keep)| **keep)
                .filter_map(|(v, _)| *v)
                .collect();
            kept.iter().sum::<f64>() / kept.len() as f64
        })
        .collect();

    let range = FeatureRange::from_values(&primary_values).ok_or_else(|| {
        AqError::insufficient_data(format!("no values for feature '{}'", request.primary))
    })?;

    debug!(
        pollutant = %request.pollutant,
        target = %request.target,
        filtered = filtered.n_rows(),
        samples = n_samples,
        indicators = column_order.encoding().n_indicators(),
        reference = column_order.encoding().reference(),
        "design matrix built"
    );

    Ok(DesignMatrix {
        x,
        y: Vector::from_vec(y),
        mask,
        column_order,
        countries,
        primary_values,
        range,
        additional_means,
    })
}
