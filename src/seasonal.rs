//! Month-dependent sampling ranges and triangular draws.
//!
//! Each month carries a plausible (low, high) range for temperature and for
//! PM2.5. A draw uses a triangular distribution whose mode sits at the
//! midpoint, so samples cluster around typical conditions while the summer
//! PM2.5 ranges still produce wildfire-season spikes.

use rand::Rng;
use rand_distr::{Distribution, Triangular};

use crate::error::GenerationError;
use crate::models::Quantity;

// ---

/// Inclusive (low, high) bounds for one month.
pub type MonthRange = (f64, f64);

/// Monthly temperature ranges (°F), January first.
pub const FRESNO_TEMPERATURE_RANGES: [MonthRange; 12] = [
    (40.0, 65.0),
    (42.0, 65.0),
    (50.0, 75.0),
    (55.0, 85.0),
    (65.0, 98.0),
    (70.0, 105.0),
    (75.0, 110.0),
    (75.0, 110.0),
    (70.0, 100.0),
    (60.0, 90.0),
    (50.0, 70.0),
    (40.0, 60.0),
];

/// Monthly PM2.5 ranges (µg/m³), January first.
pub const FRESNO_PM25_RANGES: [MonthRange; 12] = [
    (5.0, 25.0),
    (5.0, 25.0),
    (5.0, 25.0),
    (8.0, 30.0),
    (10.0, 35.0),
    (15.0, 40.0),
    (20.0, 120.0),
    (25.0, 120.0),
    (20.0, 100.0),
    (15.0, 60.0),
    (10.0, 30.0),
    (8.0, 25.0),
];

/// Per-month sampling ranges for both quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalRanges {
    pub temperature: [MonthRange; 12],
    pub pm25: [MonthRange; 12],
}

impl Default for SeasonalRanges {
    fn default() -> Self {
        SeasonalRanges {
            temperature: FRESNO_TEMPERATURE_RANGES,
            pm25: FRESNO_PM25_RANGES,
        }
    }
}

impl SeasonalRanges {
    /// Look up the range for `month` (1..=12).
    pub fn range(&self, month: u32, quantity: Quantity) -> Result<MonthRange, GenerationError> {
        // ---
        if !(1..=12).contains(&month) {
            return Err(GenerationError::MonthOutOfRange(month));
        }
        let table = match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Pm25 => &self.pm25,
        };
        Ok(table[(month - 1) as usize])
    }

    /// Check every month of both tables before generation starts.
    ///
    /// A range must be finite with `low <= high`; PM2.5 lows must also be
    /// non-negative so the converter never sees a negative concentration.
    pub fn validate(&self) -> Result<(), GenerationError> {
        // ---
        for quantity in [Quantity::Temperature, Quantity::Pm25] {
            for month in 1..=12 {
                let (low, high) = self.range(month, quantity)?;
                let negative_pm = quantity == Quantity::Pm25 && low < 0.0;
                if !low.is_finite() || !high.is_finite() || low > high || negative_pm {
                    return Err(GenerationError::InvalidRange {
                        quantity,
                        month,
                        low,
                        high,
                    });
                }
            }
        }
        Ok(())
    }

    /// Build the triangular distribution for one month and quantity.
    pub fn distribution(
        &self,
        month: u32,
        quantity: Quantity,
    ) -> Result<Triangular<f64>, GenerationError> {
        // ---
        let (low, high) = self.range(month, quantity)?;
        let mode = (low + high) / 2.0;
        Triangular::new(low, high, mode).map_err(|_| GenerationError::InvalidRange {
            quantity,
            month,
            low,
            high,
        })
    }

    /// Draw one sample for `month` and `quantity`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        month: u32,
        quantity: Quantity,
        rng: &mut R,
    ) -> Result<f64, GenerationError> {
        // ---
        Ok(self.distribution(month, quantity)?.sample(rng))
    }
}
