/// Climate queries served by the HTTP endpoint.
///
/// Thin layer over `ClimateStore`: works out the trailing one-year window
/// from the latest recorded date and shapes rows into the response types.
/// Each call into the store is its own connection, so a request that needs
/// the window and the most active station opens three in turn.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::model::{PrecipitationByDate, StationActivity, TemperatureObservation, TemperatureStats};
use crate::store::{ClimateStore, StoreError};

/// Length of the trailing window, in calendar days.
pub const WINDOW_DAYS: i64 = 365;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-request failure
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The windowed queries need at least one measurement row.
    #[error("measurement table is empty")]
    EmptyDataset,

    /// Latest stored date is not `YYYY-MM-DD`.
    #[error("stored date '{0}' is not in YYYY-MM-DD form")]
    MalformedDate(String),
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// The date `WINDOW_DAYS` calendar days before `latest`, as `YYYY-MM-DD`.
pub fn one_year_before(latest: &str) -> Result<String, QueryError> {
    let date = NaiveDate::parse_from_str(latest, DATE_FORMAT)
        .map_err(|_| QueryError::MalformedDate(latest.to_string()))?;
    let start = date - Duration::days(WINDOW_DAYS);
    Ok(start.format(DATE_FORMAT).to_string())
}

/// Most recent measurement date.
pub fn latest_date(store: &dyn ClimateStore) -> Result<Option<String>, QueryError> {
    Ok(store.latest_date()?)
}

fn window_start(store: &dyn ClimateStore) -> Result<String, QueryError> {
    let latest = latest_date(store)?.ok_or(QueryError::EmptyDataset)?;
    one_year_before(&latest)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Precipitation for the last year across all stations, one value per date.
pub fn precipitation_last_year(store: &dyn ClimateStore) -> Result<PrecipitationByDate, QueryError> {
    let since = window_start(store)?;
    let readings = store.precipitation_since(&since)?;
    Ok(PrecipitationByDate::from_readings(readings))
}

pub fn station_list(store: &dyn ClimateStore) -> Result<Vec<String>, QueryError> {
    Ok(store.station_ids()?)
}

pub fn most_active_station(store: &dyn ClimateStore) -> Result<Option<StationActivity>, QueryError> {
    Ok(store.most_active_station()?)
}

/// Last year of temperature observations from the most active station.
pub fn tobs_last_year(store: &dyn ClimateStore) -> Result<Vec<TemperatureObservation>, QueryError> {
    let since = window_start(store)?;
    let station = most_active_station(store)?.ok_or(QueryError::EmptyDataset)?;
    Ok(store.temperatures_since(&station.station, &since)?)
}

/// Min/avg/max temperature from `start`, optionally up to `end` inclusive.
///
/// `start` and `end` are not validated. Strings that are not dates compare
/// lexically like any other and typically match nothing, which yields
/// all-null stats rather than an error.
pub fn temperature_stats(
    store: &dyn ClimateStore,
    start: &str,
    end: Option<&str>,
) -> Result<TemperatureStats, QueryError> {
    Ok(store.temperature_stats(start, end)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
