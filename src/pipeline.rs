//! End-to-end generation: fleet → timestamp grid → readings → hourly.
//!
//! Everything here is synchronous and in-memory. Validation runs first, so a
//! configuration error surfaces before any reading is drawn or any table is
//! touched.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use tracing::info;

use crate::aggregate::{aggregate_hourly, truncate_to_hour};
use crate::error::GenerationError;
use crate::fleet::{default_zones, generate_fleet};
use crate::models::{HourlyAggregate, Reading, Sensor, Zone};
use crate::seasonal::SeasonalRanges;
use crate::synth::{synthesize, timestamp_grid};

// ---

/// Generation-time parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Number of virtual sensors.
    pub sensor_count: usize,
    /// Length of the generated history, in days.
    pub horizon_days: i64,
    /// Sampling interval, in minutes.
    pub interval_minutes: i64,
    /// Zones in round-robin assignment order.
    pub zones: Vec<Zone>,
    pub ranges: SeasonalRanges,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            sensor_count: 30,
            horizon_days: 730,
            interval_minutes: 10,
            zones: default_zones(),
            ranges: SeasonalRanges::default(),
        }
    }
}

impl GeneratorConfig {
    /// Reject configurations that cannot produce a consistent snapshot.
    pub fn validate(&self) -> Result<(), GenerationError> {
        // ---
        if self.zones.is_empty() {
            return Err(GenerationError::EmptyZoneTable);
        }
        self.interval()?;
        TimeDelta::try_days(self.horizon_days)
            .ok_or(GenerationError::InvalidHorizon(self.horizon_days))?;
        self.ranges.validate()
    }

    /// The sampling interval as a time span.
    pub fn interval(&self) -> Result<TimeDelta, GenerationError> {
        // ---
        match TimeDelta::try_minutes(self.interval_minutes) {
            Some(step) if self.interval_minutes > 0 => Ok(step),
            _ => Err(GenerationError::InvalidInterval(self.interval_minutes)),
        }
    }

    /// The generation window ending at `now` truncated to the hour.
    pub fn window(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), GenerationError> {
        // ---
        let end = truncate_to_hour(now);
        let start = TimeDelta::try_days(self.horizon_days)
            .and_then(|horizon| end.checked_sub_signed(horizon))
            .ok_or(GenerationError::InvalidHorizon(self.horizon_days))?;
        Ok((start, end))
    }
}

/// The in-memory result of one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub sensors: Vec<Sensor>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub readings: Vec<Reading>,
    pub hourly: Vec<HourlyAggregate>,
}

/// Run the whole pipeline for the window ending at `now`.
pub fn generate<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Snapshot, GenerationError> {
    // ---
    config.validate()?;

    let sensors = generate_fleet(config.sensor_count, &config.zones, rng)?;
    info!(
        "Generated {} sensors across {} zones",
        sensors.len(),
        config.zones.len()
    );

    let (start, end) = config.window(now)?;
    let grid = timestamp_grid(start, end, config.interval()?)?;
    info!(
        "Timestamp grid: {} points from {} to {} every {} min",
        grid.len(),
        start,
        end,
        config.interval_minutes
    );

    let readings = synthesize(&sensors, &grid, &config.ranges, rng)?;
    info!("Synthesized {} readings", readings.len());

    let hourly = aggregate_hourly(&readings);
    info!("Aggregated into {} hourly rows", hourly.len());

    Ok(Snapshot {
        sensors,
        start,
        end,
        readings,
        hourly,
    })
}
