//! Left join on text-normalized key columns.

use super::{Column, Table};
use crate::error::Result;
use std::collections::HashMap;
use tracing::warn;

/// Suffix given to right-hand columns whose name already exists on the left.
pub const RIGHT_SUFFIX: &str = "_vehicle";

/// Canonical text of a key cell: trimmed, and numbers in shortest form so
/// `2019`, ` 2019` and `2019.0` all compare equal.
pub(crate) fn key_text(column: &Column, row: usize) -> Option<String> {
    let text = column.text_at(row)?;
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v.to_string()),
        _ => Some(trimmed.to_string()),
    }
}

fn row_key(key_columns: &[&Column], row: usize) -> Option<Vec<String>> {
    key_columns.iter().map(|c| key_text(c, row)).collect()
}

/// Left-joins `right` onto `left` on the named key columns.
///
/// Every left row appears once, in order. Right rows contribute their
/// non-key columns; unmatched left rows (or rows with a null key) get
/// nulls. If `right` repeats a key, its first row wins.
///
/// # Errors
///
/// Returns `MissingColumn` if a key column is absent from either table.
pub fn left_join(left: &Table, right: &Table, keys: &[&str]) -> Result<Table> {
    let left_keys = keys
        .iter()
        .map(|k| left.column(k))
        .collect::<Result<Vec<_>>>()?;
    let right_keys = keys
        .iter()
        .map(|k| right.column(k))
        .collect::<Result<Vec<_>>>()?;

    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut duplicates = 0usize;
    for row in 0..right.n_rows() {
        if let Some(key) = row_key(&right_keys, row) {
            if index.contains_key(&key) {
                duplicates += 1;
            } else {
                index.insert(key, row);
            }
        }
    }
    if duplicates > 0 {
        warn!(
            duplicates,
            keys = ?keys,
            "right table repeats join keys; first row kept"
        );
    }

    let picks: Vec<Option<usize>> = (0..left.n_rows())
        .map(|row| row_key(&left_keys, row).and_then(|key| index.get(&key).copied()))
        .collect();

    let mut columns: Vec<(String, Column)> = left.clone().into_columns();
    for name in right.column_names() {
        if keys.contains(&name) {
            continue;
        }
        let out_name = if left.has_column(name) {
            format!("{name}{RIGHT_SUFFIX}")
        } else {
            name.to_string()
        };
        columns.push((out_name, right.column(name)?.take(&picks)));
    }

    Table::new(columns)
}
