//! Column-store table for the joined observation data.
//!
//! Columns are typed and nullable. Empty cells are null in either type.
//! Heavy wrangling is out of scope; the table supports exactly what the
//! loader, feature builder and results readers need.

mod csv_io;
mod join;

pub(crate) use csv_io::dedupe_headers;
pub(crate) use join::key_text;
pub use join::{left_join, RIGHT_SUFFIX};

use crate::error::{AqError, Result};
use serde::{Deserialize, Serialize};

/// A nullable column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Free text; `None` for empty cells.
    Text(Vec<Option<String>>),
    /// Numbers; `None` for empty, unparsable or NaN cells.
    Numeric(Vec<Option<f64>>),
}

/// Parses one CSV cell as a number. Empty and NaN cells are null.
pub(crate) fn parse_numeric_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

impl Column {
    /// Infers a column from raw cells.
    ///
    /// Numeric when every non-empty cell parses as `f64`, text otherwise.
    #[must_use]
    pub fn from_raw(cells: Vec<String>) -> Self {
        let all_numeric = cells
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .all(|c| c.parse::<f64>().is_ok());

        if all_numeric {
            Column::Numeric(cells.iter().map(|c| parse_numeric_cell(c)).collect())
        } else {
            Column::Text(
                cells
                    .into_iter()
                    .map(|c| {
                        let trimmed = c.trim();
                        (!trimmed.is_empty()).then(|| trimmed.to_string())
                    })
                    .collect(),
            )
        }
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Numeric(v) => v.len(),
        }
    }

    /// True if the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for a numeric column.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// True if cell `row` is null.
    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Column::Text(v) => v[row].is_none(),
            Column::Numeric(v) => v[row].is_none(),
        }
    }

    /// Cell `row` as text. Numbers use the shortest round-trip form, so
    /// `2019.0` renders as `2019`.
    #[must_use]
    pub fn text_at(&self, row: usize) -> Option<String> {
        match self {
            Column::Text(v) => v[row].clone(),
            Column::Numeric(v) => v[row].map(|x| x.to_string()),
        }
    }

    /// Cell `row` as a number; text cells are parsed, failures are null.
    #[must_use]
    pub fn numeric_at(&self, row: usize) -> Option<f64> {
        match self {
            Column::Text(v) => v[row].as_deref().and_then(parse_numeric_cell),
            Column::Numeric(v) => v[row],
        }
    }

    /// Gathers cells by optional index; `None` yields a null cell.
    #[must_use]
    pub fn take(&self, indices: &[Option<usize>]) -> Self {
        match self {
            Column::Text(v) => Column::Text(
                indices
                    .iter()
                    .map(|i| i.and_then(|i| v[i].clone()))
                    .collect(),
            ),
            Column::Numeric(v) => {
                Column::Numeric(indices.iter().map(|i| i.and_then(|i| v[i])).collect())
            }
        }
    }
}

/// An in-memory table of named, equally long nullable columns.
///
/// # Examples
///
/// ```
/// use aqfleet::data::{Column, Table};
///
/// let table = Table::new(vec![
///     ("Country".to_string(), Column::Text(vec![Some("AT".into()), Some("NO".into())])),
///     ("AF_fleet".to_string(), Column::Numeric(vec![Some(1.5), None])),
/// ])
/// .unwrap();
/// assert_eq!(table.shape(), (2, 2));
/// assert_eq!(table.numeric("AF_fleet").unwrap(), vec![Some(1.5), None]);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<(String, Column)>,
    n_rows: usize,
}

impl Table {
    /// Creates a table from named columns.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if columns differ in length or two
    /// columns share a name.
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |(_, c)| c.len());

        for (name, col) in &columns {
            if col.len() != n_rows {
                return Err(AqError::dimension_mismatch(
                    &format!("rows in column {name}"),
                    n_rows,
                    col.len(),
                ));
            }
        }

        let mut names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != columns.len() {
            return Err(AqError::dimension_mismatch(
                "distinct column names",
                columns.len(),
                names.len(),
            ));
        }

        Ok(Self { columns, n_rows })
    }

    /// Returns the shape as (`n_rows`, `n_cols`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in table order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// True if a column with this name exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Looks up a column by name.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the column doesn't exist.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| AqError::missing_column(name))
    }

    /// Column values as numbers (text cells parsed, failures null).
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the column doesn't exist.
    pub fn numeric(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.column(name)?;
        Ok((0..self.n_rows).map(|i| column.numeric_at(i)).collect())
    }

    /// Column values as text.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the column doesn't exist.
    pub fn text(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self.column(name)?;
        Ok((0..self.n_rows).map(|i| column.text_at(i)).collect())
    }

    /// Keeps the rows at `indices`, in order.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let picks: Vec<Option<usize>> = indices.iter().copied().map(Some).collect();
        Self {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.take(&picks)))
                .collect(),
            n_rows: indices.len(),
        }
    }

    /// Keeps the rows where `column` equals `value` as text.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the column doesn't exist.
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<Self> {
        let col = self.column(column)?;
        let keep: Vec<usize> = (0..self.n_rows)
            .filter(|&i| col.text_at(i).as_deref() == Some(value))
            .collect();
        Ok(self.select_rows(&keep))
    }

    pub(crate) fn into_columns(self) -> Vec<(String, Column)> {
        self.columns
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
