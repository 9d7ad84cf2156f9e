//! `aqfleet best`: summarize a best-model results table.

use crate::error::Result;
use crate::output;
use aqfleet::results::ResultsTable;
use std::path::Path;

/// Countries whose appearances in result targets are reported.
const HIGHLIGHT_COUNTRIES: [&str; 5] = ["NO", "CH", "AT", "NL", "DK"];

/// Pollutants listed as best explained.
const TOP_POLLUTANTS: usize = 3;

pub(crate) fn run(results: &Path, top: usize, json: bool) -> Result<()> {
    let table = ResultsTable::load(results)?;

    if json {
        println!("{}", serde_json::to_string_pretty(table.top(top))?);
        return Ok(());
    }

    output::section(&format!("Top {top} models"));
    for (i, row) in table.top(top).iter().enumerate() {
        println!(
            "  {:>2}. {} ({}) {} R²={}",
            i + 1,
            row.pollutant,
            row.target,
            row.model,
            output::format_r2(row.r2)
        );
    }

    output::section("Notable patterns");
    if let Some(first) = table.rows().first() {
        output::success(&format!(
            "Best overall: {} for {} ({}) with R² = {}",
            first.model,
            first.pollutant,
            first.target,
            output::format_r2(first.r2)
        ));
    }
    for (code, n) in table.country_appearances(&HIGHLIGHT_COUNTRIES) {
        output::kv(code, format!("{n} appearances"));
    }
    for (pollutant, n) in table.top_pollutants(TOP_POLLUTANTS) {
        output::kv(pollutant, format!("{n} rows"));
    }
    Ok(())
}
