//! `aqfleet combine`: merge per-country fleet CSV files.

use crate::error::Result;
use crate::output;
use aqfleet::combine::combine_directory;
use std::path::Path;

pub(crate) fn run(input: &Path, output_dir: &Path, json: bool) -> Result<()> {
    let outputs = combine_directory(input, output_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        return Ok(());
    }

    if outputs.is_empty() {
        output::warning(&format!("no fleet files found in {}", input.display()));
        return Ok(());
    }
    for out in &outputs {
        output::success(&format!(
            "{} rows from {} countries -> {}",
            out.n_rows,
            out.countries.len(),
            out.path.display()
        ));
    }
    Ok(())
}
