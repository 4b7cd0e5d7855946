//! Time-series synthesis: one reading per sensor per grid timestamp.
//!
//! The timestamp grid is built once and shared by every sensor. Each sensor
//! is then synthesized as an independent batch that borrows the grid and
//! returns owned readings, so batches have no shared mutable state beyond
//! the random source handed in by the caller.

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use rand::Rng;
use uuid::{Builder, Uuid};

use crate::aqi;
use crate::error::GenerationError;
use crate::fleet::round_to;
use crate::models::{Quantity, Reading, Sensor};
use crate::seasonal::SeasonalRanges;

// ---

/// Fixed divisor used to derive `CIG_APX` from AQI.
pub const CIG_DIVISOR: f64 = 22.0;

/// Secondary index: AQI divided by [`CIG_DIVISOR`], rounded to two decimals.
pub fn cig_apx(aqi: u16) -> f64 {
    round_to(f64::from(aqi) / CIG_DIVISOR, 2)
}

/// Build the regular grid covering `[start, end]` inclusive.
///
/// Returns an empty grid when `start > end`. The interval must be positive.
pub fn timestamp_grid(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: TimeDelta,
) -> Result<Vec<DateTime<Utc>>, GenerationError> {
    // ---
    if interval <= TimeDelta::zero() {
        return Err(GenerationError::InvalidInterval(interval.num_minutes()));
    }

    let mut grid = Vec::new();
    if start > end {
        return Ok(grid);
    }

    let span = (end - start).num_seconds();
    let step = interval.num_seconds().max(1);
    grid.reserve((span / step + 1) as usize);

    let mut ts = start;
    while ts <= end {
        grid.push(ts);
        match ts.checked_add_signed(interval) {
            Some(next) => ts = next,
            None => break,
        }
    }
    Ok(grid)
}

/// Produce the readings for one sensor over the shared grid.
///
/// Temperature and PM2.5 are independent triangular draws keyed on each
/// timestamp's month, rounded to one decimal. AQI is converted from the
/// rounded PM2.5 so the stored pair always agrees.
pub fn synthesize_sensor<R: Rng + ?Sized>(
    sensor: &Sensor,
    grid: &[DateTime<Utc>],
    ranges: &SeasonalRanges,
    rng: &mut R,
) -> Result<Vec<Reading>, GenerationError> {
    // ---
    let mut readings = Vec::with_capacity(grid.len());

    for &timestamp in grid {
        let month = timestamp.month();
        let temperature = round_to(ranges.sample(month, Quantity::Temperature, rng)?, 1);
        let pm2_5 = round_to(ranges.sample(month, Quantity::Pm25, rng)?, 1);
        let aqi = aqi::convert(pm2_5);

        readings.push(Reading {
            reading_id: random_uuid(rng),
            sensor_id: sensor.sensor_id.clone(),
            longitude: sensor.longitude,
            latitude: sensor.latitude,
            zip_code: sensor.zip_code.clone(),
            timestamp,
            temperature,
            pm2_5,
            aqi,
            cig_apx: cig_apx(aqi),
        });
    }

    Ok(readings)
}

/// Synthesize every sensor in `fleet`, concatenating the per-sensor batches.
///
/// An empty fleet or grid produces an empty result.
pub fn synthesize<R: Rng + ?Sized>(
    fleet: &[Sensor],
    grid: &[DateTime<Utc>],
    ranges: &SeasonalRanges,
    rng: &mut R,
) -> Result<Vec<Reading>, GenerationError> {
    // ---
    if fleet.is_empty() || grid.is_empty() {
        tracing::warn!(
            sensors = fleet.len(),
            timestamps = grid.len(),
            "Empty fleet or timestamp grid, no readings generated"
        );
        return Ok(Vec::new());
    }

    let mut readings = Vec::with_capacity(fleet.len() * grid.len());
    for sensor in fleet {
        let batch = synthesize_sensor(sensor, grid, ranges, rng)?;
        tracing::debug!(
            "Synthesized {} readings for {} ({})",
            batch.len(),
            sensor.sensor_id,
            sensor.zip_code
        );
        readings.extend(batch);
    }
    Ok(readings)
}

/// A v4 UUID drawn from `rng`, so seeded runs reproduce their ids.
fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    Builder::from_random_bytes(bytes).into_uuid()
}
