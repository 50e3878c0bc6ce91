//! Climate API Service - Main Entrypoint
//!
//! Serves the climate observations dataset over HTTP:
//! 1. Resolves configuration (defaults, climate.toml, environment, flags)
//! 2. Connects to the dataset and verifies the measurement/station tables
//! 3. Answers requests on a fixed pool of worker threads
//!
//! Usage:
//!   cargo run --release                                  # hawaii.sqlite on 127.0.0.1:5000
//!   cargo run --release -- --port 8080                   # different port
//!   cargo run --release -- --database-url sqlite:////data/hawaii.sqlite
//!
//! Environment:
//!   DATABASE_URL - sqlite:// or postgresql:// connection string
//!   CLIMATE_PORT - listen port
//!   RUST_LOG     - log filter (default: info)

use std::env;
use std::process::ExitCode;

use climate_service::config::{self, USAGE};
use climate_service::db::{self, DatabaseUrl};
use climate_service::endpoint::{ClimateApi, EndpointServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = match config::parse_args(env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };
    if cli.help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let config = match config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Bind the dataset before opening the listener
    let store = match DatabaseUrl::parse(&config.database_url).and_then(|url| db::connect_and_verify(&url)) {
        Ok(store) => store,
        Err(e) => {
            error!("Initialization failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Climate dataset verified");

    let server = match EndpointServer::bind(&config.listen_addr(), ClimateApi::new(store), config.workers) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    server.serve();
    ExitCode::SUCCESS
}
