//! Country fixed-effect encoding and design column order.

use crate::error::{AqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Country used as the reference level whenever it is present.
pub const PREFERRED_REFERENCE: &str = "AT";

/// Prefix of country indicator column names.
pub const INDICATOR_PREFIX: &str = "Country_";

/// Which country a prediction is made for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CountrySelection {
    /// The reference country (every indicator 0).
    #[default]
    Reference,
    /// A country by code.
    Country(String),
}

impl CountrySelection {
    /// Selection for `code`, or the reference when `code` is `None`.
    #[must_use]
    pub fn from_code(code: Option<&str>) -> Self {
        code.map_or(Self::Reference, |c| Self::Country(c.to_string()))
    }
}

/// One-hot country encoding with an explicit reference level.
///
/// The reference is `AT` when present, otherwise the smallest code; every
/// other distinct code gets an indicator, sorted ascending. The intercept of
/// a linear model is therefore the reference country's baseline.
///
/// # Examples
///
/// ```
/// use aqfleet::features::CountryEncoding;
///
/// let enc = CountryEncoding::from_codes(["SE", "NO", "AT", "NO"]).unwrap();
/// assert_eq!(enc.reference(), "AT");
/// assert_eq!(enc.column_names(), vec!["Country_NO", "Country_SE"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryEncoding {
    reference: String,
    indicators: Vec<String>,
}

impl CountryEncoding {
    /// Builds the encoding from the codes present; `None` if there are none.
    pub fn from_codes<I, S>(codes: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = codes
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect();

        let reference = if distinct.contains(PREFERRED_REFERENCE) {
            PREFERRED_REFERENCE.to_string()
        } else {
            distinct.iter().next()?.clone()
        };

        let indicators = distinct.into_iter().filter(|c| *c != reference).collect();
        Some(Self {
            reference,
            indicators,
        })
    }

    /// The reference country code.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Codes that have an indicator column, ascending.
    #[must_use]
    pub fn indicator_codes(&self) -> &[String] {
        &self.indicators
    }

    /// Number of indicator columns (distinct countries minus one).
    #[must_use]
    pub fn n_indicators(&self) -> usize {
        self.indicators.len()
    }

    /// Indicator column names, `Country_<code>`.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.indicators
            .iter()
            .map(|c| format!("{INDICATOR_PREFIX}{c}"))
            .collect()
    }

    /// Every known code, ascending, reference included.
    #[must_use]
    pub fn known_codes(&self) -> Vec<String> {
        let mut all: Vec<String> = self.indicators.clone();
        all.push(self.reference.clone());
        all.sort();
        all
    }

    /// Position of the code's indicator, `None` for the reference.
    ///
    /// # Errors
    ///
    /// `UnknownCategory` for a code that is neither the reference nor
    /// an indicator.
    pub fn indicator_index(&self, code: &str) -> Result<Option<usize>> {
        if code == self.reference {
            return Ok(None);
        }
        self.indicators
            .binary_search_by(|c| c.as_str().cmp(code))
            .map(Some)
            .map_err(|_| AqError::UnknownCategory {
                value: code.to_string(),
                known: self.known_codes(),
            })
    }

    /// Resolves a selection to an indicator position.
    ///
    /// # Errors
    ///
    /// `UnknownCategory` as for [`CountryEncoding::indicator_index`].
    pub fn resolve(&self, selection: &CountrySelection) -> Result<Option<usize>> {
        match selection {
            CountrySelection::Reference => Ok(None),
            CountrySelection::Country(code) => self.indicator_index(code),
        }
    }

    /// The country code a selection stands for.
    ///
    /// # Errors
    ///
    /// `UnknownCategory` as for [`CountryEncoding::indicator_index`].
    pub fn code_for(&self, selection: &CountrySelection) -> Result<&str> {
        Ok(match self.resolve(selection)? {
            None => &self.reference,
            Some(idx) => &self.indicators[idx],
        })
    }

    /// One-hot values for a selection.
    ///
    /// # Errors
    ///
    /// `UnknownCategory` as for [`CountryEncoding::indicator_index`].
    pub fn one_hot(&self, selection: &CountrySelection) -> Result<Vec<f64>> {
        let mut values = vec![0.0; self.indicators.len()];
        if let Some(idx) = self.resolve(selection)? {
            values[idx] = 1.0;
        }
        Ok(values)
    }
}

/// The column layout of a design matrix:
/// `[primary, additional..., Country_<code>...]`.
///
/// Training and prediction both build rows through this type, so the
/// order cannot drift between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnOrder {
    primary: String,
    additional: Vec<String>,
    encoding: CountryEncoding,
}

impl ColumnOrder {
    /// Creates a column order.
    #[must_use]
    pub fn new(
        primary: impl Into<String>,
        additional: Vec<String>,
        encoding: CountryEncoding,
    ) -> Self {
        Self {
            primary: primary.into(),
            additional,
            encoding,
        }
    }

    /// Primary feature name.
    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Additional feature names, in column order.
    #[must_use]
    pub fn additional(&self) -> &[String] {
        &self.additional
    }

    /// The country encoding.
    #[must_use]
    pub fn encoding(&self) -> &CountryEncoding {
        &self.encoding
    }

    /// Total number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.additional.len() + self.encoding.n_indicators()
    }

    /// Always false: the primary column is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All column names in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.len());
        names.push(self.primary.clone());
        names.extend(self.additional.iter().cloned());
        names.extend(self.encoding.column_names());
        names
    }

    /// Builds one design row.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if `additional` has the wrong length
    /// - `UnknownCategory` if the selected country is not encoded
    pub fn build_row(
        &self,
        primary: f64,
        additional: &[f64],
        selection: &CountrySelection,
    ) -> Result<Vec<f64>> {
        if additional.len() != self.additional.len() {
            return Err(AqError::dimension_mismatch(
                "additional features",
                self.additional.len(),
                additional.len(),
            ));
        }
        let mut row = Vec::with_capacity(self.len());
        row.push(primary);
        row.extend_from_slice(additional);
        row.extend(self.encoding.one_hot(selection)?);
        Ok(row)
    }
}
