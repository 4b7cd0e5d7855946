//! Synthetic air-quality data for a ZIP-code sensor network.
//!
//! The pipeline runs leaf-first:
//! - [`aqi`] converts PM2.5 concentrations to AQI via breakpoint tables
//! - [`seasonal`] draws month-dependent temperature and PM2.5 samples
//! - [`fleet`] places virtual sensors round-robin across zones
//! - [`synth`] produces a dense reading series per sensor
//! - [`aggregate`] reduces readings to per-sensor hourly means
//!
//! [`pipeline`] ties these together, [`store`] writes the resulting snapshot
//! to PostgreSQL atomically, [`export`] writes the optional CSV time series,
//! and [`summary`] computes the read-side figures consumers derive from the
//! hourly table.

pub mod aggregate;
pub mod aqi;
pub mod config;
pub mod error;
pub mod export;
pub mod fleet;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod seasonal;
pub mod store;
pub mod summary;
pub mod synth;

pub use config::Config;
pub use error::GenerationError;
pub use models::{HourlyAggregate, Quantity, Reading, Sensor, Zone};
pub use pipeline::{generate, GeneratorConfig, Snapshot};
