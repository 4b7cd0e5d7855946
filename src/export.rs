//! CSV time-series export of raw readings.
//!
//! One row per reading with the columns
//! `timestamp,zip,sensor_id,lat,lon,pm25,aqi,quality_flag,source`, the flat
//! file layout REST-style readers load directly. Rows keep the order of the
//! readings passed in.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::SecondsFormat;
use serde::Serialize;
use tracing::info;

use crate::models::Reading;

// ---

/// Header row, written even when there are no readings.
pub const TIMESERIES_HEADER: [&str; 9] = [
    "timestamp",
    "zip",
    "sensor_id",
    "lat",
    "lon",
    "pm25",
    "aqi",
    "quality_flag",
    "source",
];

#[derive(Debug, Serialize)]
struct TimeseriesRow<'a> {
    timestamp: String,
    zip: &'a str,
    sensor_id: &'a str,
    lat: f64,
    lon: f64,
    pm25: String,
    aqi: u16,
    quality_flag: &'static str,
    source: &'static str,
}

impl<'a> From<&'a Reading> for TimeseriesRow<'a> {
    fn from(r: &'a Reading) -> Self {
        TimeseriesRow {
            timestamp: r.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            zip: &r.zip_code,
            sensor_id: &r.sensor_id,
            lat: r.latitude,
            lon: r.longitude,
            pm25: format!("{:.2}", r.pm2_5),
            aqi: r.aqi,
            quality_flag: "ok",
            source: "synthetic",
        }
    }
}

/// Write `readings` as CSV to any writer. Returns the number of data rows.
pub fn write_timeseries<W: io::Write>(writer: W, readings: &[Reading]) -> Result<usize> {
    // ---
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    out.write_record(TIMESERIES_HEADER)?;
    for reading in readings {
        out.serialize(TimeseriesRow::from(reading))?;
    }
    out.flush()?;
    Ok(readings.len())
}

/// Create (or truncate) the file at `path` and write the time series to it.
pub fn export_timeseries(path: &Path, readings: &[Reading]) -> Result<usize> {
    // ---
    let file = File::create(path)
        .map_err(|e| anyhow!("Failed to create CSV export '{}': {}", path.display(), e))?;
    let rows = write_timeseries(file, readings)
        .map_err(|e| anyhow!("Failed to write CSV export '{}': {}", path.display(), e))?;

    info!("Wrote {} rows to {}", rows, path.display());
    Ok(rows)
}
