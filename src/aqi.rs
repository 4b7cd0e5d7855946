//! PM2.5 → AQI conversion using the EPA piecewise-linear breakpoint table.
//!
//! Each breakpoint maps a closed concentration interval onto an index
//! interval. Adjacent buckets share their boundary value, so the first
//! matching bucket wins and the curve is continuous: 12.0 → 50,
//! 35.4 → 100, and so on. Concentrations above the last bucket clamp to
//! [`AQI_MAX`].

use serde::Serialize;

// ---

/// Upper bound of the index scale.
pub const AQI_MAX: u16 = 500;

/// One row of the breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub conc_low: f64,
    pub conc_high: f64,
    pub index_low: f64,
    pub index_high: f64,
}

const fn bp(conc_low: f64, conc_high: f64, index_low: f64, index_high: f64) -> Breakpoint {
    Breakpoint {
        conc_low,
        conc_high,
        index_low,
        index_high,
    }
}

/// PM2.5 breakpoints in ascending concentration order.
pub const PM25_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 12.0, 0.0, 50.0),
    bp(12.0, 35.4, 50.0, 100.0),
    bp(35.4, 55.4, 100.0, 150.0),
    bp(55.4, 150.4, 150.0, 200.0),
    bp(150.4, 250.4, 200.0, 300.0),
    bp(250.4, 350.4, 300.0, 400.0),
    bp(350.4, 500.4, 400.0, 500.0),
];

/// Convert a PM2.5 concentration (µg/m³) to an AQI value in `0..=500`.
///
/// Values above the highest breakpoint clamp to 500. Negative and NaN
/// inputs are outside the sampler's output and map to 0.
pub fn convert(concentration: f64) -> u16 {
    // ---
    if concentration.is_nan() || concentration <= 0.0 {
        return 0;
    }

    for b in &PM25_BREAKPOINTS {
        if b.conc_low <= concentration && concentration <= b.conc_high {
            let slope = (b.index_high - b.index_low) / (b.conc_high - b.conc_low);
            let index = slope * (concentration - b.conc_low) + b.index_low;
            return index.round() as u16;
        }
    }

    AQI_MAX
}

/// Health category of an AQI value, in ascending severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// All categories, mildest first.
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitiveGroups,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    /// Classify an AQI value. Takes `f64` so hourly means classify directly.
    pub fn from_aqi(aqi: f64) -> Self {
        // ---
        if aqi <= 50.0 {
            AqiCategory::Good
        } else if aqi <= 100.0 {
            AqiCategory::Moderate
        } else if aqi <= 150.0 {
            AqiCategory::UnhealthyForSensitiveGroups
        } else if aqi <= 200.0 {
            AqiCategory::Unhealthy
        } else if aqi <= 300.0 {
            AqiCategory::VeryUnhealthy
        } else {
            AqiCategory::Hazardous
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy (Sensitive)",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Conventional AQI colour as a hex RGB string.
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#00e400",
            AqiCategory::Moderate => "#ffff00",
            AqiCategory::UnhealthyForSensitiveGroups => "#ff7e00",
            AqiCategory::Unhealthy => "#ff0000",
            AqiCategory::VeryUnhealthy => "#8f3f97",
            AqiCategory::Hazardous => "#7e0023",
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_breakpoint_anchors() {
        // ---
        assert_eq!(convert(0.0), 0);
        assert_eq!(convert(12.0), 50);
        assert_eq!(convert(35.4), 100);
        assert_eq!(convert(55.4), 150);
        assert_eq!(convert(150.4), 200);
        assert_eq!(convert(250.4), 300);
        assert_eq!(convert(350.4), 400);
        assert_eq!(convert(500.4), 500);
    }

    #[test]
    fn test_clamps_above_table() {
        // ---
        assert_eq!(convert(500.5), 500);
        assert_eq!(convert(10_000.0), 500);
        assert_eq!(convert(f64::INFINITY), 500);
    }

    #[test]
    fn test_interpolates_within_bucket() {
        // ---
        // 6.0 is halfway through [0, 12] -> 25
        assert_eq!(convert(6.0), 25);
        // 23.7 is halfway through [12, 35.4] -> 75
        assert_eq!(convert(23.7), 75);
        // 100.0 in (55.4, 150.4]: 50/95 * 44.6 + 150 = 173.47 -> 173
        assert_eq!(convert(100.0), 173);
    }

    #[test]
    fn test_out_of_contract_inputs_map_to_zero() {
        // ---
        assert_eq!(convert(-3.0), 0);
        assert_eq!(convert(f64::NAN), 0);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        // ---
        let mut previous = 0;
        for step in 0..=6000 {
            let value = step as f64 * 0.1;
            let aqi = convert(value);
            assert!(
                aqi >= previous,
                "convert({}) = {} dropped below {}",
                value,
                aqi,
                previous
            );
            assert!(aqi <= AQI_MAX);
            previous = aqi;
        }
    }

    #[test]
    fn test_table_is_contiguous() {
        // ---
        for pair in PM25_BREAKPOINTS.windows(2) {
            assert_eq!(pair[0].conc_high, pair[1].conc_low);
            assert_eq!(pair[0].index_high, pair[1].index_low);
        }
    }

    #[test]
    fn test_category_boundaries() {
        // ---
        assert_eq!(AqiCategory::from_aqi(0.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50.5), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(100.0), AqiCategory::Moderate);
        assert_eq!(
            AqiCategory::from_aqi(101.0),
            AqiCategory::UnhealthyForSensitiveGroups
        );
        assert_eq!(AqiCategory::from_aqi(200.0), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(300.0), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(301.0), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::Hazardous.label(), "Hazardous");
        assert_eq!(AqiCategory::Good.color(), "#00e400");
    }
}
