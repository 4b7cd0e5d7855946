//! Virtual sensor fleet: round-robin zone assignment with jittered coordinates.

use rand::Rng;

use crate::error::GenerationError;
use crate::models::{Sensor, Zone};

// ---

/// Maximum coordinate offset, in degrees, applied around a zone's reference point.
pub const JITTER_DEGREES: f64 = 0.005;

/// Fresno, CA ZIP codes and their reference (latitude, longitude).
pub const FRESNO_ZONES: [(&str, f64, f64); 15] = [
    ("93701", 36.745, -119.785),
    ("93702", 36.752, -119.754),
    ("93703", 36.767, -119.750),
    ("93704", 36.790, -119.800),
    ("93705", 36.775, -119.823),
    ("93706", 36.707, -119.799),
    ("93710", 36.813, -119.771),
    ("93711", 36.840, -119.851),
    ("93720", 36.860, -119.760),
    ("93722", 36.800, -119.880),
    ("93723", 36.820, -119.960),
    ("93725", 36.680, -119.776),
    ("93726", 36.793, -119.760),
    ("93727", 36.750, -119.700),
    ("93728", 36.757, -119.815),
];

/// The built-in zone table, in round-robin order.
pub fn default_zones() -> Vec<Zone> {
    FRESNO_ZONES
        .iter()
        .map(|(zip, lat, lon)| Zone::new(zip, *lat, *lon))
        .collect()
}

/// Generate `count` sensors spread across `zones`.
///
/// Sensor `i` is placed in zone `i % zones.len()`, so when the count does
/// not divide evenly the first zones in table order get the extra sensor.
/// Ids are `sensor_01`, `sensor_02`, ... padded to the width of the
/// largest id so lexical order matches numeric order.
pub fn generate_fleet<R: Rng + ?Sized>(
    count: usize,
    zones: &[Zone],
    rng: &mut R,
) -> Result<Vec<Sensor>, GenerationError> {
    // ---
    if zones.is_empty() {
        return Err(GenerationError::EmptyZoneTable);
    }

    let width = count.to_string().len().max(2);

    let sensors = (0..count)
        .map(|i| {
            let zone = &zones[i % zones.len()];
            let lat = zone.latitude + rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES);
            let lon = zone.longitude + rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES);
            Sensor {
                sensor_id: format!("sensor_{:0width$}", i + 1, width = width),
                zip_code: zone.zip_code.clone(),
                latitude: round_to(lat, 6),
                longitude: round_to(lon, 6),
            }
        })
        .collect();

    Ok(sensors)
}

/// Round `value` to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
