//! Data models for the air-quality pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

// ---

/// The two quantities drawn by the seasonal sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Air temperature, degrees Fahrenheit.
    Temperature,
    /// Fine particulate matter concentration, µg/m³.
    Pm25,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Temperature => write!(f, "temperature"),
            Quantity::Pm25 => write!(f, "PM2.5"),
        }
    }
}

/// A geographic zone (ZIP code) and its reference coordinate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Zone {
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Zone {
    pub fn new(zip_code: &str, latitude: f64, longitude: f64) -> Self {
        Zone {
            zip_code: zip_code.to_string(),
            latitude,
            longitude,
        }
    }
}

/// A virtual sensor placed inside a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    // ---
    pub sensor_id: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One raw reading, a row of the `air_quality` table.
///
/// `aqi` is always the breakpoint conversion of `pm2_5` as stored here,
/// and `cig_apx` is `aqi / 22` rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    // ---
    pub reading_id: Uuid,
    pub sensor_id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub zip_code: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub pm2_5: f64,
    pub aqi: u16,
    pub cig_apx: f64,
}

/// Per-sensor, per-hour means, a row of the `air_quality_hourly` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct HourlyAggregate {
    // ---
    #[sqlx(rename = "Sensor_ID")]
    pub sensor_id: String,
    #[sqlx(rename = "Zip_Code")]
    pub zip_code: String,
    #[sqlx(rename = "Longitude")]
    pub longitude: f64,
    #[sqlx(rename = "Latitude")]
    pub latitude: f64,
    #[sqlx(rename = "Hour_Timestamp")]
    pub hour_timestamp: DateTime<Utc>,
    #[sqlx(rename = "Avg_Temp")]
    pub avg_temp: f64,
    #[sqlx(rename = "Avg_PM2_5")]
    pub avg_pm2_5: f64,
    #[sqlx(rename = "Avg_AQI")]
    pub avg_aqi: f64,
    #[sqlx(rename = "Avg_CIG_APX")]
    pub avg_cig_apx: f64,
    /// Number of raw readings folded into this row.
    #[sqlx(rename = "Reading_Count")]
    pub reading_count: i64,
}
