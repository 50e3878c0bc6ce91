//! climate_service: read-only HTTP API over a daily climate observations dataset.
//!
//! # Module structure
//!
//! ```text
//! climate_service
//! ├── model     — response and row types (PrecipitationByDate, TemperatureStats, …)
//! ├── config    — service settings: defaults, climate.toml, environment, flags
//! ├── schema    — declared measurement/station layout and column verification
//! ├── db        — connection URL parsing, startup connect + schema check
//! ├── store
//! │   ├── sqlite — single-file dataset backend
//! │   └── pg     — PostgreSQL backend
//! ├── queries   — windowed precipitation/temperature queries, range aggregates
//! ├── endpoint  — routing, JSON responses, worker-pool HTTP server
//! └── fixtures (test only) — temporary seeded SQLite databases
//! ```

// Public modules
pub mod config;
pub mod db;
pub mod endpoint;
pub mod model;
pub mod queries;
pub mod schema;
pub mod store;

#[cfg(test)]
mod fixtures;
