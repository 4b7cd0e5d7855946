//! Error types for the generation pipeline.
//!
//! Every variant here is a configuration problem detected before any
//! output is written. Empty inputs and out-of-table concentrations are not
//! errors: the former yield empty output, the latter clamp to AQI 500.

use std::fmt;

use crate::models::Quantity;

// ---

/// Configuration errors raised while validating generation inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// A month outside 1..=12 was requested from the seasonal tables.
    MonthOutOfRange(u32),
    /// A monthly sampling range cannot back a triangular distribution.
    InvalidRange {
        quantity: Quantity,
        month: u32,
        low: f64,
        high: f64,
    },
    /// The zone table has no entries, so sensors cannot be placed.
    EmptyZoneTable,
    /// The sampling interval must be a positive number of minutes that fits
    /// in a time span.
    InvalidInterval(i64),
    /// The horizon in days does not fit in a time span, or reaches before
    /// the earliest representable timestamp.
    InvalidHorizon(i64),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::MonthOutOfRange(month) => {
                write!(f, "No sampling range configured for month {}", month)
            }
            GenerationError::InvalidRange {
                quantity,
                month,
                low,
                high,
            } => write!(
                f,
                "Invalid {} range for month {}: ({}, {})",
                quantity, month, low, high
            ),
            GenerationError::EmptyZoneTable => write!(f, "Zone table is empty"),
            GenerationError::InvalidInterval(minutes) => {
                write!(f, "Invalid sampling interval: {} minutes", minutes)
            }
            GenerationError::InvalidHorizon(days) => {
                write!(f, "Invalid generation horizon: {} days", days)
            }
        }
    }
}

impl std::error::Error for GenerationError {}
