/// PostgreSQL-backed climate store.
///
/// Same two tables as the SQLite file. Numeric columns are cast to
/// `float8` and dates to `text` in SQL so that `REAL`, `NUMERIC` and `DATE`
/// column types all read back the same way.

use postgres::{Client, NoTls, Row};

use super::{ClimateStore, StoreError};
use crate::model::{PrecipitationReading, StationActivity, TemperatureObservation, TemperatureStats};

pub struct PgStore {
    url: String,
}

impl PgStore {
    /// Bind to a PostgreSQL database, checking once that it accepts connections.
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let store = Self { url: url.to_string() };
        store.connect()?.close()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Client, StoreError> {
        Ok(Client::connect(&self.url, NoTls)?)
    }
}

fn stats_from_row(row: &Row) -> Result<TemperatureStats, StoreError> {
    Ok(TemperatureStats {
        min: row.try_get(0)?,
        avg: row.try_get(1)?,
        max: row.try_get(2)?,
    })
}

impl ClimateStore for PgStore {
    fn table_columns(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let mut client = self.connect()?;
        let rows = client.query(
            "SELECT column_name::text
             FROM information_schema.columns
             WHERE table_schema = current_schema() AND table_name = $1",
            &[&table],
        )?;
        let columns = rows
            .iter()
            .map(|row| row.try_get::<_, String>(0))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn latest_date(&self) -> Result<Option<String>, StoreError> {
        let mut client = self.connect()?;
        let row = client.query_one("SELECT MAX(date)::text FROM measurement", &[])?;
        Ok(row.try_get(0)?)
    }

    fn precipitation_since(&self, since: &str) -> Result<Vec<PrecipitationReading>, StoreError> {
        let mut client = self.connect()?;
        let rows = client.query(
            "SELECT date::text, prcp::float8
             FROM measurement
             WHERE date::text >= $1
             ORDER BY date, id",
            &[&since],
        )?;

        let mut readings = Vec::with_capacity(rows.len());
        for row in rows {
            readings.push(PrecipitationReading {
                date: row.try_get(0)?,
                prcp: row.try_get(1)?,
            });
        }
        Ok(readings)
    }

    fn station_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut client = self.connect()?;
        let rows = client.query("SELECT station::text FROM station", &[])?;
        let stations = rows
            .iter()
            .map(|row| row.try_get::<_, String>(0))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stations)
    }

    fn most_active_station(&self) -> Result<Option<StationActivity>, StoreError> {
        let mut client = self.connect()?;
        let row = client.query_opt(
            "SELECT station::text, COUNT(*) AS observations
             FROM measurement
             GROUP BY station
             ORDER BY observations DESC, station ASC
             LIMIT 1",
            &[],
        )?;

        match row {
            Some(row) => Ok(Some(StationActivity {
                station: row.try_get(0)?,
                observations: row.try_get(1)?,
            })),
            None => Ok(None),
        }
    }

    fn temperatures_since(
        &self,
        station: &str,
        since: &str,
    ) -> Result<Vec<TemperatureObservation>, StoreError> {
        let mut client = self.connect()?;
        let rows = client.query(
            "SELECT date::text, tobs::float8
             FROM measurement
             WHERE station = $1 AND date::text >= $2
             ORDER BY date, id",
            &[&station, &since],
        )?;

        let mut observations = Vec::with_capacity(rows.len());
        for row in rows {
            observations.push(TemperatureObservation {
                date: row.try_get(0)?,
                tobs: row.try_get(1)?,
            });
        }
        Ok(observations)
    }

    fn temperature_stats(&self, start: &str, end: Option<&str>) -> Result<TemperatureStats, StoreError> {
        let mut client = self.connect()?;
        let row = match end {
            Some(end) => client.query_one(
                "SELECT MIN(tobs)::float8, AVG(tobs)::float8, MAX(tobs)::float8
                 FROM measurement
                 WHERE date::text >= $1 AND date::text <= $2",
                &[&start, &end],
            )?,
            None => client.query_one(
                "SELECT MIN(tobs)::float8, AVG(tobs)::float8, MAX(tobs)::float8
                 FROM measurement
                 WHERE date::text >= $1",
                &[&start],
            )?,
        };
        stats_from_row(&row)
    }
}
