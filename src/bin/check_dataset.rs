//! Dataset check
//!
//! Connects to the configured climate dataset, verifies the schema and
//! prints the facts the API depends on: latest date, trailing window,
//! station count and the most active station.
//!
//! Usage:
//!   cargo run --bin check_dataset
//!   cargo run --bin check_dataset -- --database-url sqlite:////data/hawaii.sqlite
//!
//! Environment:
//!   DATABASE_URL - sqlite:// or postgresql:// connection string

use std::env;
use std::process::ExitCode;

use climate_service::config;
use climate_service::db::{self, DatabaseUrl};
use climate_service::queries;

fn main() -> ExitCode {
    let result = config::parse_args(env::args().skip(1))
        .map_err(|e| e.to_string())
        .and_then(|cli| config::load(&cli).map_err(|e| e.to_string()))
        .and_then(|config| DatabaseUrl::parse(&config.database_url).map_err(|e| e.to_string()))
        .and_then(|url| {
            println!("Connecting to: {}", url);
            db::connect_and_verify(&url).map_err(|e| e.to_string())
        });

    let store = match result {
        Ok(store) => store,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("✓ measurement and station tables verified");

    match queries::latest_date(store.as_ref()) {
        Ok(Some(latest)) => {
            println!("✓ Latest date: {}", latest);
            match queries::one_year_before(&latest) {
                Ok(start) => println!("✓ Trailing window: {} .. {}", start, latest),
                Err(e) => println!("✗ {}", e),
            }
        }
        Ok(None) => println!("✗ measurement table is empty"),
        Err(e) => println!("✗ Error reading latest date: {}", e),
    }

    match queries::station_list(store.as_ref()) {
        Ok(stations) => println!("✓ Stations: {}", stations.len()),
        Err(e) => println!("✗ Error listing stations: {}", e),
    }

    match queries::most_active_station(store.as_ref()) {
        Ok(Some(busiest)) => println!(
            "✓ Most active station: {} ({} observations)",
            busiest.station, busiest.observations
        ),
        Ok(None) => println!("✗ No measurements to rank"),
        Err(e) => println!("✗ Error ranking stations: {}", e),
    }

    ExitCode::SUCCESS
}
