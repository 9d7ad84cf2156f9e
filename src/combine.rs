//! Per-country fleet CSV combiner.
//!
//! Raw fleet exports come as one file per country and kind, named
//! `<COUNTRY>_<anything>newreg.csv`, `..._EU.csv` or
//! `..._registrations.csv`. Each kind is concatenated into one table with
//! leading `Country` and `Index` columns. Cells are copied verbatim.
//! Raw headers that repeat, or that clash with the leading columns, are
//! renamed `X.1`, `X.2`, ...

use crate::data::dedupe_headers;
use crate::error::{AqError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The three raw fleet file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FleetFileKind {
    /// New registrations per fuel type.
    NewRegistrations,
    /// EU-level comparison tables.
    Eu,
    /// Registered fleet stock.
    Registrations,
}

impl FleetFileKind {
    /// Every kind, in output order.
    pub const ALL: [FleetFileKind; 3] = [
        FleetFileKind::NewRegistrations,
        FleetFileKind::Eu,
        FleetFileKind::Registrations,
    ];

    /// File-name suffix that identifies the kind.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            FleetFileKind::NewRegistrations => "newreg.csv",
            FleetFileKind::Eu => "EU.csv",
            FleetFileKind::Registrations => "registrations.csv",
        }
    }

    /// Name of the combined output file.
    #[must_use]
    pub fn output_name(self) -> &'static str {
        match self {
            FleetFileKind::NewRegistrations => "combined_newreg_data.csv",
            FleetFileKind::Eu => "combined_eu_data.csv",
            FleetFileKind::Registrations => "combined_registrations_data.csv",
        }
    }

    /// Kind of a raw file by name; `None` for unrelated files.
    #[must_use]
    pub fn classify(file_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| file_name.ends_with(k.suffix()))
    }
}

/// Country code of a raw file: the part of the name before the first `_`.
#[must_use]
pub fn country_of(file_name: &str) -> &str {
    file_name.split('_').next().unwrap_or(file_name)
}

/// A concatenated table of raw string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CombinedTable {
    /// Header row, starting with `Country` and `Index`.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, each as wide as the header.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Writes the table as CSV.
    ///
    /// # Errors
    ///
    /// `Csv`/`Io` if the file cannot be written.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

struct RawFile {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

const LEADING_COLUMNS: [&str; 2] = ["Country", "Index"];

fn read_raw(path: &Path) -> Result<RawFile> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let mut names: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    names.extend(reader.headers()?.iter().map(str::to_string));
    let headers = dedupe_headers(names).split_off(LEADING_COLUMNS.len());
    let records = reader
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;
    Ok(RawFile { headers, records })
}

/// Concatenates `(country, path)` sources in the order given.
///
/// Headers are the union over all sources in first-seen order; a source
/// lacking a column leaves it empty.
///
/// # Errors
///
/// `Csv`/`Io` if a source cannot be read.
pub fn combine_files(sources: &[(String, PathBuf)]) -> Result<CombinedTable> {
    let raw = sources
        .iter()
        .map(|(country, path)| read_raw(path).map(|file| (country.as_str(), file)))
        .collect::<Result<Vec<_>>>()?;

    let mut headers: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    for (_, file) in &raw {
        for h in &file.headers {
            if !headers.contains(h) {
                headers.push(h.clone());
            }
        }
    }

    let mut rows = Vec::new();
    for (country, file) in &raw {
        let positions: Vec<usize> = file
            .headers
            .iter()
            .map(|h| headers.iter().position(|x| x == h).unwrap_or(0))
            .collect();
        for (index, record) in file.records.iter().enumerate() {
            let mut row = vec![String::new(); headers.len()];
            row[0] = (*country).to_string();
            row[1] = index.to_string();
            for (cell, &pos) in record.iter().zip(&positions) {
                row[pos] = cell.clone();
            }
            rows.push(row);
        }
    }

    Ok(CombinedTable { headers, rows })
}

/// What one kind contributed to a combine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombineOutput {
    /// File kind.
    pub kind: FleetFileKind,
    /// Countries combined, in file order.
    pub countries: Vec<String>,
    /// Rows written.
    pub n_rows: usize,
    /// Output path.
    pub path: PathBuf,
}

/// Combines every raw fleet file in `input` and writes one CSV per kind to
/// `output` (created if needed). Kinds with no input files are skipped.
///
/// Files are taken in sorted name order. If two files of one kind share a
/// country prefix, the later one replaces the earlier.
///
/// # Errors
///
/// - `MissingSource` if `input` is not a directory
/// - `Io`/`Csv` on read or write failure
pub fn combine_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<Vec<CombineOutput>> {
    let input = input.as_ref();
    let output = output.as_ref();
    if !input.is_dir() {
        return Err(AqError::missing_source(input));
    }

    let mut names: Vec<String> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();

    let mut grouped: BTreeMap<FleetFileKind, Vec<(String, PathBuf)>> = BTreeMap::new();
    for name in names {
        let Some(kind) = FleetFileKind::classify(&name) else {
            debug!(file = %name, "skipping unrelated file");
            continue;
        };
        let country = country_of(&name).to_string();
        let sources = grouped.entry(kind).or_default();
        if let Some(slot) = sources.iter_mut().find(|(c, _)| *c == country) {
            warn!(file = %name, country = %country, "replacing earlier file for country");
            slot.1 = input.join(&name);
        } else {
            sources.push((country, input.join(&name)));
        }
    }

    fs::create_dir_all(output)?;

    let mut outputs = Vec::new();
    for kind in FleetFileKind::ALL {
        let Some(sources) = grouped.get(&kind) else {
            warn!(?kind, "no input files for kind");
            continue;
        };
        let table = combine_files(sources)?;
        let path = output.join(kind.output_name());
        table.write_csv(&path)?;
        info!(
            ?kind,
            files = sources.len(),
            rows = table.n_rows(),
            path = %path.display(),
            "wrote combined fleet table"
        );
        outputs.push(CombineOutput {
            kind,
            countries: sources.iter().map(|(c, _)| c.clone()).collect(),
            n_rows: table.n_rows(),
            path,
        });
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("write fixture");
    }

    #[test]
    fn test_classify_and_country() {
        assert_eq!(
            FleetFileKind::classify("AT_2023_newreg.csv"),
            Some(FleetFileKind::NewRegistrations)
        );
        assert_eq!(FleetFileKind::classify("NO_fleet_EU.csv"), Some(FleetFileKind::Eu));
        assert_eq!(
            FleetFileKind::classify("SE_registrations.csv"),
            Some(FleetFileKind::Registrations)
        );
        assert_eq!(FleetFileKind::classify("README.md"), None);
        assert_eq!(country_of("AT_2023_newreg.csv"), "AT");
        assert_eq!(country_of("plain.csv"), "plain.csv");
    }

    #[test]
    fn test_combine_files_header_union() {
        let dir = tempfile::tempdir().expect("temp dir");
        write(dir.path(), "a.csv", "Year,BEV\n2019,10\n2020,12\n");
        write(dir.path(), "b.csv", "Year,PHEV,BEV\n2019,3,7\n");

        let table = combine_files(&[
            ("AT".to_string(), dir.path().join("a.csv")),
            ("NO".to_string(), dir.path().join("b.csv")),
        ])
        .expect("combine");

        assert_eq!(table.headers(), &["Country", "Index", "Year", "BEV", "PHEV"]);
        assert_eq!(
            table.rows(),
            &[
                vec!["AT", "0", "2019", "10", ""],
                vec!["AT", "1", "2020", "12", ""],
                vec!["NO", "0", "2019", "7", "3"],
            ]
        );
    }

    #[test]
    fn test_combine_files_renames_clashing_headers() {
        let dir = tempfile::tempdir().expect("temp dir");
        write(dir.path(), "a.csv", "Country,Year,BEV,BEV\nAustria,2019,10,11\n");

        let table = combine_files(&[("AT".to_string(), dir.path().join("a.csv"))])
            .expect("combine");

        assert_eq!(
            table.headers(),
            &["Country", "Index", "Country.1", "Year", "BEV", "BEV.1"]
        );
        assert_eq!(
            table.rows(),
            &[vec!["AT", "0", "Austria", "2019", "10", "11"]]
        );
    }

    #[test]
    fn test_combine_directory_writes_each_kind() {
        let input = tempfile::tempdir().expect("temp dir");
        let output = tempfile::tempdir().expect("temp dir");
        write(input.path(), "SE_x_newreg.csv", "Year,BEV\n2020,5\n");
        write(input.path(), "AT_x_newreg.csv", "Year,BEV\n2020,1\n");
        write(input.path(), "AT_EU.csv", "Year,Share\n2020,0.1\n");
        write(input.path(), "notes.txt", "ignored");

        let out_dir = output.path().join("processed");
        let outputs = combine_directory(input.path(), &out_dir).expect("combine");

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].kind, FleetFileKind::NewRegistrations);
        assert_eq!(outputs[0].countries, vec!["AT", "SE"]);
        assert_eq!(outputs[0].n_rows, 2);

        let written = fs::read_to_string(out_dir.join("combined_newreg_data.csv")).expect("read");
        assert_eq!(written, "Country,Index,Year,BEV\nAT,0,2020,1\nSE,0,2020,5\n");
        assert!(out_dir.join("combined_eu_data.csv").is_file());
        assert!(!out_dir.join("combined_registrations_data.csv").exists());
    }

    #[test]
    fn test_combine_directory_missing_input() {
        let output = tempfile::tempdir().expect("temp dir");
        let err = combine_directory("/no/such/fleet_data", output.path()).expect_err("missing");
        assert!(matches!(err, AqError::MissingSource { .. }));
    }
}
