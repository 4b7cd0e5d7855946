//! Hourly aggregation of raw readings.
//!
//! Readings are grouped by sensor, zone, coordinate and the hour containing
//! their timestamp; each group becomes one [`HourlyAggregate`] holding the
//! arithmetic means. Coordinates are part of the key because they are fixed
//! per sensor. A sensor whose coordinate changed inside an hour would split
//! into two rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{HourlyAggregate, Reading};

// ---

/// Truncate a timestamp to the start of its hour.
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    // ---
    let secs = ts.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(3600), 0).unwrap_or(ts)
}

/// Group key, ordered hour-first so iteration yields ascending hours.
///
/// Coordinates are keyed by their bit patterns; floats are not `Ord`.
type GroupKey = (DateTime<Utc>, String, String, u64, u64);

#[derive(Default)]
struct Accumulator {
    temperature: f64,
    pm2_5: f64,
    aqi: f64,
    cig_apx: f64,
    count: i64,
}

/// Reduce `readings` to one row per (sensor, zone, coordinate, hour).
///
/// Sums are accumulated in input order, so the same input always produces
/// bit-identical output. Rows come back ordered by hour, then sensor id.
pub fn aggregate_hourly(readings: &[Reading]) -> Vec<HourlyAggregate> {
    // ---
    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();

    for r in readings {
        let key = (
            truncate_to_hour(r.timestamp),
            r.sensor_id.clone(),
            r.zip_code.clone(),
            r.longitude.to_bits(),
            r.latitude.to_bits(),
        );
        let acc = groups.entry(key).or_default();
        acc.temperature += r.temperature;
        acc.pm2_5 += r.pm2_5;
        acc.aqi += f64::from(r.aqi);
        acc.cig_apx += r.cig_apx;
        acc.count += 1;
    }

    groups
        .into_iter()
        .map(|((hour, sensor_id, zip_code, lon_bits, lat_bits), acc)| {
            let n = acc.count as f64;
            HourlyAggregate {
                sensor_id,
                zip_code,
                longitude: f64::from_bits(lon_bits),
                latitude: f64::from_bits(lat_bits),
                hour_timestamp: hour,
                avg_temp: acc.temperature / n,
                avg_pm2_5: acc.pm2_5 / n,
                avg_aqi: acc.aqi / n,
                avg_cig_apx: acc.cig_apx / n,
                reading_count: acc.count,
            }
        })
        .collect()
}
