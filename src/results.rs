//! Precomputed best/worst model tables.
//!
//! One row per (pollutant, target) with the winning (or losing) model
//! family and its R². Used to suggest a default model kind and to
//! summarize findings.

use crate::data::Table;
use crate::error::{AqError, Result};
use crate::model::ModelKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Accepted R² column names, in order of preference.
pub const R2_COLUMNS: [&str; 2] = ["R2", "R2_train"];

/// One row of a results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    /// Pollutant identifier.
    pub pollutant: String,
    /// Target column.
    pub target: String,
    /// Model name as written in the table.
    pub model: String,
    /// R² score, if present.
    pub r2: Option<f64>,
}

impl ModelScore {
    /// Parsed model family.
    ///
    /// # Errors
    ///
    /// `UnknownModel` if the name is not on the menu.
    pub fn kind(&self) -> Result<ModelKind> {
        self.model.parse()
    }
}

/// A results table, rows in file order.
///
/// # Examples
///
/// ```
/// use aqfleet::model::ModelKind;
/// use aqfleet::results::ResultsTable;
///
/// let csv = "Pollutant,Target,Model,R2_train\nPM10,AnnualAvg_mean,Ridge,0.91\n";
/// let table = ResultsTable::from_csv_reader(csv.as_bytes()).unwrap();
/// assert_eq!(table.suggest_model("PM10", "AnnualAvg_mean"), Some(ModelKind::Ridge));
/// assert_eq!(table.rows()[0].r2, Some(0.91));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    rows: Vec<ModelScore>,
}

impl ResultsTable {
    /// Reads a results CSV.
    ///
    /// # Errors
    ///
    /// `MissingSource` if the file is absent, otherwise as for
    /// [`ResultsTable::from_table`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_table(&Table::from_csv_path(path)?)
    }

    /// Parses a results CSV from any reader.
    ///
    /// # Errors
    ///
    /// As for [`ResultsTable::from_table`], plus `Csv` on malformed input.
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Self::from_table(&Table::from_csv_reader(reader)?)
    }

    /// Builds the table from parsed CSV columns.
    ///
    /// Rows without a pollutant, target or model are skipped.
    ///
    /// # Errors
    ///
    /// `MissingColumn` if `Pollutant`, `Target` or `Model` is absent, or if
    /// neither `R2` nor `R2_train` exists.
    pub fn from_table(table: &Table) -> Result<Self> {
        let pollutants = table.text("Pollutant")?;
        let targets = table.text("Target")?;
        let models = table.text("Model")?;
        let r2_column = R2_COLUMNS
            .into_iter()
            .find(|name| table.has_column(name))
            .ok_or_else(|| AqError::missing_column(R2_COLUMNS.join(" or ")))?;
        let scores = table.numeric(r2_column)?;

        let mut rows = Vec::with_capacity(table.n_rows());
        for i in 0..table.n_rows() {
            match (&pollutants[i], &targets[i], &models[i]) {
                (Some(pollutant), Some(target), Some(model)) => rows.push(ModelScore {
                    pollutant: pollutant.clone(),
                    target: target.clone(),
                    model: model.clone(),
                    r2: scores[i],
                }),
                _ => debug!(row = i, "skipping incomplete results row"),
            }
        }

        debug!(rows = rows.len(), r2_column, "loaded results table");
        Ok(Self { rows })
    }

    /// All rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[ModelScore] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row for (`pollutant`, `target`).
    #[must_use]
    pub fn find(&self, pollutant: &str, target: &str) -> Option<&ModelScore> {
        self.rows
            .iter()
            .find(|r| r.pollutant == pollutant && r.target == target)
    }

    /// Model family of the first row for (`pollutant`, `target`).
    ///
    /// `None` when there is no such row or its model name is not on the
    /// menu.
    #[must_use]
    pub fn suggest_model(&self, pollutant: &str, target: &str) -> Option<ModelKind> {
        let row = self.find(pollutant, target)?;
        match row.kind() {
            Ok(kind) => Some(kind),
            Err(err) => {
                warn!(%err, pollutant, target, "results table names an unknown model");
                None
            }
        }
    }

    /// Distinct pollutants in first-seen order.
    #[must_use]
    pub fn pollutants(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|r| r.pollutant.as_str()))
    }

    /// Distinct targets for `pollutant` in first-seen order.
    #[must_use]
    pub fn targets(&self, pollutant: &str) -> Vec<&str> {
        distinct(
            self.rows
                .iter()
                .filter(|r| r.pollutant == pollutant)
                .map(|r| r.target.as_str()),
        )
    }

    /// The first `n` rows.
    #[must_use]
    pub fn top(&self, n: usize) -> &[ModelScore] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// For each code, the number of rows whose target mentions it.
    /// Codes with no appearances are left out.
    #[must_use]
    pub fn country_appearances<'a>(&self, codes: &[&'a str]) -> Vec<(&'a str, usize)> {
        codes
            .iter()
            .map(|&code| {
                let n = self.rows.iter().filter(|r| r.target.contains(code)).count();
                (code, n)
            })
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    /// The `k` most frequent pollutants, ties in first-seen order.
    #[must_use]
    pub fn top_pollutants(&self, k: usize) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .pollutants()
            .into_iter()
            .map(|p| (p, self.rows.iter().filter(|r| r.pollutant == p).count()))
            .collect();
        // Stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(k);
        counts
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for v in values {
        if !seen.contains(&v) {
            seen.push(v);
        }
    }
    seen
}
