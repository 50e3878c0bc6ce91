/// Test fixtures: a throwaway SQLite copy of the climate schema.
///
/// `TestDb` owns a temp directory holding `climate.sqlite`; the file is
/// deleted when the fixture is dropped. Measurements are inserted in the
/// order given, so ids ascend with slice position.

use rusqlite::{Connection, params};
use tempfile::TempDir;

use crate::db::DatabaseUrl;
use crate::store::SqliteStore;

pub const MEASUREMENT_DDL: &str = "CREATE TABLE measurement (
    id INTEGER PRIMARY KEY,
    station TEXT,
    date TEXT,
    prcp FLOAT,
    tobs FLOAT
);";

pub const STATION_DDL: &str = "CREATE TABLE station (
    id INTEGER PRIMARY KEY,
    station TEXT,
    name TEXT,
    latitude FLOAT,
    longitude FLOAT,
    elevation FLOAT
);";

/// `(station, name, latitude, longitude, elevation)`
pub const STATIONS: &[(&str, &str, f64, f64, f64)] = &[
    ("USC00519397", "WAIKIKI 717.2, HI US", 21.2716, -157.8168, 3.0),
    ("USC00513117", "KANEOHE 838.1, HI US", 21.4234, -157.8015, 14.6),
    ("USC00519281", "WAIHEE 837.5, HI US", 21.45167, -157.84889, 32.9),
];

pub struct Measurement {
    pub station: &'static str,
    pub date: &'static str,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

pub fn m(station: &'static str, date: &'static str, prcp: Option<f64>, tobs: f64) -> Measurement {
    Measurement { station, date, prcp, tobs }
}

pub struct TestDb {
    dir: TempDir,
}

impl TestDb {
    /// A database file with no tables at all.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = TestDb { dir };
        // Write a header page so read-only opens succeed
        db.execute_batch("PRAGMA user_version = 1;");
        db
    }

    pub fn path(&self) -> std::path::PathBuf {
        self.dir.path().join("climate.sqlite")
    }

    pub fn url(&self) -> DatabaseUrl {
        DatabaseUrl::Sqlite(self.path())
    }

    pub fn store(&self) -> SqliteStore {
        SqliteStore::open(self.path()).expect("Failed to open test store")
    }

    pub fn execute_batch(&self, sql: &str) {
        let conn = Connection::open(self.path()).expect("Failed to open test database");
        conn.execute_batch(sql).expect("Failed to run fixture SQL");
    }
}

/// Schema plus the station roster plus the given measurements.
pub fn seeded_db(measurements: &[Measurement]) -> TestDb {
    let db = TestDb::empty();
    db.execute_batch(MEASUREMENT_DDL);
    db.execute_batch(STATION_DDL);

    let mut conn = Connection::open(db.path()).expect("Failed to open test database");
    let tx = conn.transaction().expect("Failed to start transaction");
    for (station, name, lat, lon, elev) in STATIONS {
        tx.execute(
            "INSERT INTO station (station, name, latitude, longitude, elevation) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![station, name, lat, lon, elev],
        )
        .expect("Failed to insert station");
    }
    for row in measurements {
        tx.execute(
            "INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)",
            params![row.station, row.date, row.prcp, row.tobs],
        )
        .expect("Failed to insert measurement");
    }
    tx.commit().expect("Failed to commit fixture rows");

    db
}

/// A small slice of the Hawaii dataset around its last recorded day.
pub fn sample_measurements() -> Vec<Measurement> {
    vec![
        m("USC00519397", "2016-08-22", Some(0.4), 78.0),
        m("USC00519397", "2016-08-23", Some(0.0), 81.0),
        m("USC00519281", "2016-08-23", Some(1.79), 77.0),
        m("USC00519281", "2017-01-01", None, 66.0),
        m("USC00519281", "2017-08-18", Some(0.06), 79.0),
        m("USC00513117", "2017-08-22", Some(0.0), 82.0),
        m("USC00519397", "2017-08-23", Some(0.0), 81.0),
        m("USC00519281", "2017-08-23", Some(0.45), 76.0),
    ]
}
