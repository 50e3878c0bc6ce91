/// SQLite-backed climate store.
///
/// Holds only the file path. Every query opens the file read-only, so the
/// dataset can never be modified through this service and concurrent
/// workers each get their own connection.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use super::{ClimateStore, StoreError};
use crate::model::{PrecipitationReading, StationActivity, TemperatureObservation, TemperatureStats};

pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Bind to an existing SQLite file.
    ///
    /// Opens one connection up front so a missing file is reported at
    /// startup rather than on the first request.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let store = Self { path: path.as_ref().to_path_buf() };
        store.connect()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

impl ClimateStore for SqliteStore {
    fn table_columns(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn latest_date(&self) -> Result<Option<String>, StoreError> {
        let conn = self.connect()?;
        let latest: Option<String> =
            conn.query_row("SELECT MAX(date) FROM measurement", [], |row| row.get(0))?;
        Ok(latest)
    }

    fn precipitation_since(&self, since: &str) -> Result<Vec<PrecipitationReading>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT date, prcp
             FROM measurement
             WHERE date >= ?1
             ORDER BY date, id",
        )?;
        let readings = stmt
            .query_map(params![since], |row| {
                Ok(PrecipitationReading {
                    date: row.get(0)?,
                    prcp: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(readings)
    }

    fn station_ids(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT station FROM station")?;
        let stations = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stations)
    }

    fn most_active_station(&self) -> Result<Option<StationActivity>, StoreError> {
        let conn = self.connect()?;
        let activity = conn
            .query_row(
                "SELECT station, COUNT(*) AS observations
                 FROM measurement
                 GROUP BY station
                 ORDER BY observations DESC, station ASC
                 LIMIT 1",
                [],
                |row| {
                    Ok(StationActivity {
                        station: row.get(0)?,
                        observations: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(activity)
    }

    fn temperatures_since(
        &self,
        station: &str,
        since: &str,
    ) -> Result<Vec<TemperatureObservation>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT date, tobs
             FROM measurement
             WHERE station = ?1 AND date >= ?2
             ORDER BY date, id",
        )?;
        let observations = stmt
            .query_map(params![station, since], |row| {
                Ok(TemperatureObservation {
                    date: row.get(0)?,
                    tobs: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(observations)
    }

    fn temperature_stats(&self, start: &str, end: Option<&str>) -> Result<TemperatureStats, StoreError> {
        let conn = self.connect()?;
        let to_stats = |row: &rusqlite::Row<'_>| -> rusqlite::Result<TemperatureStats> {
            Ok(TemperatureStats {
                min: row.get(0)?,
                avg: row.get(1)?,
                max: row.get(2)?,
            })
        };

        let stats = match end {
            Some(end) => conn.query_row(
                "SELECT MIN(tobs), AVG(tobs), MAX(tobs)
                 FROM measurement
                 WHERE date >= ?1 AND date <= ?2",
                params![start, end],
                to_stats,
            )?,
            None => conn.query_row(
                "SELECT MIN(tobs), AVG(tobs), MAX(tobs)
                 FROM measurement
                 WHERE date >= ?1",
                params![start],
                to_stats,
            )?,
        };
        Ok(stats)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
