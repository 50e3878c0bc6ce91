//! Storage backends for the climate dataset.
//!
//! `ClimateStore` is the seam between the query functions and whatever
//! holds the `measurement` and `station` tables. Each method runs exactly
//! one query on a connection it opens itself and drops before returning,
//! so a store handle carries no session state and can be shared freely
//! between request workers.
//!
//! ```text
//! store
//! ├── sqlite   — single-file dataset (the usual deployment)
//! └── pg       — the same two tables hosted in PostgreSQL
//! ```

pub mod pg;
pub mod sqlite;

pub use self::pg::PgStore;
pub use self::sqlite::SqliteStore;

use thiserror::Error;

use crate::model::{PrecipitationReading, StationActivity, TemperatureObservation, TemperatureStats};

/// Error raised by a backend while connecting or querying.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] ::postgres::Error),
}

/// Read-only access to the climate tables.
///
/// Dates are `YYYY-MM-DD` strings and every date filter is a plain string
/// comparison; callers may pass anything and get whatever that comparison
/// matches.
pub trait ClimateStore: Send + Sync {
    /// Column names of `table`, empty when the table does not exist.
    fn table_columns(&self, table: &str) -> Result<Vec<String>, StoreError>;

    /// Largest `measurement.date`, `None` for an empty table.
    fn latest_date(&self) -> Result<Option<String>, StoreError>;

    /// All `(date, prcp)` rows with `date >= since`, nulls included,
    /// ordered by date then id.
    fn precipitation_since(&self, since: &str) -> Result<Vec<PrecipitationReading>, StoreError>;

    /// Every station identifier, one per station row.
    fn station_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Station with the most measurement rows. Equal counts resolve to the
    /// lexically smallest identifier.
    fn most_active_station(&self) -> Result<Option<StationActivity>, StoreError>;

    /// `(date, tobs)` rows for one station with `date >= since`, ordered by
    /// date then id.
    fn temperatures_since(
        &self,
        station: &str,
        since: &str,
    ) -> Result<Vec<TemperatureObservation>, StoreError>;

    /// Min/avg/max of `tobs` for `date >= start` and, if given, `date <= end`.
    fn temperature_stats(&self, start: &str, end: Option<&str>) -> Result<TemperatureStats, StoreError>;
}
