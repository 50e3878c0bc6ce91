/// Shared data types for the climate query layer.
///
/// These are the shapes that flow from a `ClimateStore` through the
/// query functions and out of the HTTP endpoint. Serialization lives with
/// the types because the two result collections deliberately serialize
/// differently: precipitation collapses into a single date-keyed object,
/// temperature observations stay a list of one-entry objects.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// One `(date, prcp)` pair from the measurement table.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecipitationReading {
    pub date: String,
    /// Null in the store stays `None`; it is a value, not a gap to skip.
    pub prcp: Option<f64>,
}

/// One `(date, tobs)` pair for a single station.
///
/// Serializes as `{"<date>": <tobs>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureObservation {
    pub date: String,
    pub tobs: f64,
}

impl Serialize for TemperatureObservation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.date, &self.tobs)?;
        map.end()
    }
}

/// Station with the largest number of measurement rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StationActivity {
    pub station: String,
    pub observations: i64,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Min / average / max observed temperature over a date range.
///
/// Every field is `None` when no rows matched.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct TemperatureStats {
    #[serde(rename = "TMIN")]
    pub min: Option<f64>,
    #[serde(rename = "TAVG")]
    pub avg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub max: Option<f64>,
}

/// Precipitation keyed by date.
///
/// Several stations report on the same date; building the map keeps only
/// the value from the last reading seen for each date.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
#[serde(transparent)]
pub struct PrecipitationByDate(BTreeMap<String, Option<f64>>);

impl PrecipitationByDate {
    pub fn from_readings(readings: Vec<PrecipitationReading>) -> Self {
        let mut by_date = BTreeMap::new();
        for reading in readings {
            by_date.insert(reading.date, reading.prcp);
        }
        Self(by_date)
    }

    pub fn get(&self, date: &str) -> Option<Option<f64>> {
        self.0.get(date).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
