//! Loads and joins the air-quality and vehicle-fleet sources.

use crate::data::{left_join, Table};
use crate::error::{AqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::path::Path;
use tracing::{info, warn};

/// Country key column shared by both sources.
pub const COUNTRY_COLUMN: &str = "Country";
/// Year key column shared by both sources.
pub const YEAR_COLUMN: &str = "Year";
/// Pollutant identifier column of the air-quality source.
pub const POLLUTANT_COLUMN: &str = "Pollutant";
/// Join keys, in order.
pub const JOIN_KEYS: [&str; 2] = [COUNTRY_COLUMN, YEAR_COLUMN];

/// Fingerprint of the bytes of both source files.
///
/// Any edit to either file changes the version, which in turn invalidates
/// every cached model trained on the old snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceVersion(pub u64);

impl SourceVersion {
    /// Hashes the two source payloads in order.
    #[must_use]
    pub fn from_bytes(air_quality: &[u8], vehicles: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        air_quality.hash(&mut hasher);
        vehicles.hash(&mut hasher);
        Self(hasher.finish())
    }
}

impl std::fmt::Display for SourceVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// The joined observation table together with the snapshot it came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Air-quality rows with vehicle columns attached.
    pub table: Table,
    /// Fingerprint of the source files.
    pub version: SourceVersion,
}

impl Dataset {
    /// Reads both files and left-joins vehicles onto air quality on
    /// (Country, Year).
    ///
    /// Both paths are checked before anything is read.
    ///
    /// # Errors
    ///
    /// - `MissingSource` if either file is absent
    /// - `MissingColumn` if a key column is absent
    /// - `Csv`/`Io` on unreadable input
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(air_quality: P, vehicles: Q) -> Result<Self> {
        let air_quality = air_quality.as_ref();
        let vehicles = vehicles.as_ref();

        for path in [air_quality, vehicles] {
            if !path.is_file() {
                return Err(AqError::missing_source(path));
            }
        }

        let aq_bytes = std::fs::read(air_quality)?;
        let veh_bytes = std::fs::read(vehicles)?;
        Self::from_bytes(&aq_bytes, &veh_bytes)
    }

    /// Same as [`Dataset::load`] over in-memory CSV payloads.
    ///
    /// # Errors
    ///
    /// `MissingColumn` if a key column is absent, `Csv` on malformed input.
    pub fn from_bytes(air_quality: &[u8], vehicles: &[u8]) -> Result<Self> {
        let version = SourceVersion::from_bytes(air_quality, vehicles);
        let aq = Table::from_csv_reader(air_quality)?;
        let veh = Table::from_csv_reader(vehicles)?;

        let table = left_join(&aq, &veh, &JOIN_KEYS)?;

        let duplicates = duplicate_observation_keys(&table)?;
        if duplicates > 0 {
            warn!(
                duplicates,
                "joined data repeats (country, year, pollutant) keys"
            );
        }

        info!(
            rows = table.n_rows(),
            columns = table.n_cols(),
            version = %version,
            "loaded joined dataset"
        );
        Ok(Self { table, version })
    }
}

/// Joins the two sources and returns only the table.
///
/// # Errors
///
/// See [`Dataset::load`].
pub fn load_joined<P: AsRef<Path>, Q: AsRef<Path>>(air_quality: P, vehicles: Q) -> Result<Table> {
    Dataset::load(air_quality, vehicles).map(|d| d.table)
}

/// Counts rows whose (Country, Year, Pollutant) key was already seen.
///
/// Tables without a `Pollutant` column report zero.
///
/// # Errors
///
/// Returns `MissingColumn` if a join key column is absent.
pub fn duplicate_observation_keys(table: &Table) -> Result<usize> {
    if !table.has_column(POLLUTANT_COLUMN) {
        return Ok(0);
    }
    let country = table.column(COUNTRY_COLUMN)?;
    let year = table.column(YEAR_COLUMN)?;
    let pollutant = table.column(POLLUTANT_COLUMN)?;

    let mut seen = HashSet::new();
    let mut duplicates = 0;
    for row in 0..table.n_rows() {
        let key = (
            crate::data::key_text(country, row),
            crate::data::key_text(year, row),
            pollutant.text_at(row),
        );
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    Ok(duplicates)
}
