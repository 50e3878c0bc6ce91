/// Table layout the service binds to.
///
/// The dataset is produced by an external loader, so nothing here creates
/// or migrates tables. Instead the expected columns are declared once and
/// checked against the live store at startup; a store that does not match
/// never gets as far as serving requests.

use crate::db::DbConfigError;

/// A table and the columns the query layer reads from it.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Daily observations: one row per station per date.
pub const MEASUREMENT: TableSpec = TableSpec {
    name: "measurement",
    columns: &["id", "station", "date", "prcp", "tobs"],
};

/// Weather station roster.
pub const STATION: TableSpec = TableSpec {
    name: "station",
    columns: &["station", "name", "latitude", "longitude", "elevation"],
};

pub const REQUIRED_TABLES: &[TableSpec] = &[MEASUREMENT, STATION];

/// Compares the columns a store reported for `table` with what it must have.
///
/// An empty `found` list means the table does not exist. Extra columns are
/// fine; names are matched case-insensitively.
pub fn verify_columns(table: &TableSpec, found: &[String]) -> Result<(), DbConfigError> {
    if found.is_empty() {
        return Err(DbConfigError::MissingTable(table.name.to_string()));
    }

    let missing: Vec<String> = table
        .columns
        .iter()
        .filter(|expected| !found.iter().any(|col| col.eq_ignore_ascii_case(expected)))
        .map(|expected| expected.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(DbConfigError::MissingColumns {
            table: table.name.to_string(),
            columns: missing,
        });
    }

    Ok(())
}
