//! CSV reading into [`Table`].

use super::{Column, Table};
use crate::error::{AqError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Renames repeated headers `X`, `X` to `X`, `X.1` so column names stay unique.
pub(crate) fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let count = seen.entry(h.clone()).or_insert(0);
            let name = if *count == 0 {
                h.clone()
            } else {
                format!("{h}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

impl Table {
    /// Reads a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns `MissingSource` if the file does not exist and `Csv` on
    /// malformed input.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AqError::missing_source(path));
        }
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Reads CSV data with a header row from any reader.
    ///
    /// Short rows are padded with empty cells; column types are inferred
    /// per [`Column::from_raw`].
    ///
    /// # Errors
    ///
    /// Returns `Csv` on malformed input.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let headers = dedupe_headers(headers);
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (j, column) in cells.iter_mut().enumerate() {
                column.push(record.get(j).unwrap_or("").to_string());
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| (name, Column::from_raw(raw)))
            .collect();
        Table::new(columns)
    }
}
