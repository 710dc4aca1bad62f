//! Duration rounding to a billable unit.

use crate::config::ConfigError;

/// Default rounding unit in minutes.
pub const DEFAULT_ROUND_TO_MINUTES: f64 = 5.0;

/// The default boundary is `unit / 2.3`, slightly below the midpoint, so
/// remainders a little under half a unit already round up.
pub const DEFAULT_BOUNDARY_DIVISOR: f64 = 2.3;

const MS_PER_MINUTE: f64 = 60_000.0;
const US_PER_MINUTE: f64 = 60_000_000.0;

/// Rounds elapsed durations (in milliseconds) to a multiple of a fixed unit.
///
/// The boundary is kept in microseconds, matching the resolution the
/// boundary was historically computed at, so that `unit / 2.3` compares the
/// same way on every platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationRounder {
    unit_ms: u64,
    boundary_us: u64,
}

impl DurationRounder {
    /// Builds a rounder from a unit and boundary given in minutes.
    ///
    /// `rounding_boundary_minutes = None` selects `unit / 2.3`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_minutes(
        round_to_minutes: f64,
        rounding_boundary_minutes: Option<f64>,
    ) -> Result<Self, ConfigError> {
        if !round_to_minutes.is_finite() || round_to_minutes <= 0.0 {
            return Err(ConfigError::InvalidRoundTo(round_to_minutes));
        }
        let unit_ms = (round_to_minutes * MS_PER_MINUTE).round() as u64;
        if unit_ms == 0 {
            return Err(ConfigError::InvalidRoundTo(round_to_minutes));
        }

        let boundary_us = match rounding_boundary_minutes {
            Some(minutes) if !minutes.is_finite() || minutes < 0.0 => {
                return Err(ConfigError::InvalidBoundary(minutes));
            }
            Some(minutes) => (minutes * US_PER_MINUTE).round_ties_even() as u64,
            None => (unit_ms as f64 * 1000.0 / DEFAULT_BOUNDARY_DIVISOR).round_ties_even() as u64,
        };

        Ok(Self {
            unit_ms,
            boundary_us,
        })
    }

    /// The rounding unit in milliseconds.
    pub const fn unit_ms(&self) -> u64 {
        self.unit_ms
    }

    /// The remainder threshold in microseconds at or above which a duration
    /// rounds up.
    pub const fn boundary_us(&self) -> u64 {
        self.boundary_us
    }

    /// Rounds `duration_ms` to a multiple of the unit.
    ///
    /// Zero stays zero. Any non-zero duration shorter than one unit becomes
    /// exactly one unit. Otherwise the remainder is compared against the
    /// boundary.
    pub const fn round(&self, duration_ms: u64) -> u64 {
        if duration_ms == 0 {
            return 0;
        }

        let quotient = duration_ms / self.unit_ms;
        let remainder = duration_ms % self.unit_ms;

        if quotient == 0 {
            return self.unit_ms;
        }
        // Exact multiples stay put even with a zero boundary.
        if remainder == 0 {
            return duration_ms;
        }
        if remainder.saturating_mul(1000) >= self.boundary_us {
            (quotient + 1).saturating_mul(self.unit_ms)
        } else {
            quotient * self.unit_ms
        }
    }
}

impl Default for DurationRounder {
    /// Five minutes with the `unit / 2.3` boundary.
    fn default() -> Self {
        Self {
            unit_ms: 300_000,
            boundary_us: 130_434_783,
        }
    }
}
