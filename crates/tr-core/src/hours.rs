//! Decimal hours with fixed two-digit precision.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

const MS_PER_HOUR: u64 = 3_600_000;
const FRACTION_DIGITS: u32 = 2;

/// A number of hours quantized to two decimal places.
///
/// Arithmetic stays in base-10 so sums of quantized values never drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(Decimal);

impl Hours {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Converts milliseconds to hours, rounding half away from zero at the
    /// third fraction digit.
    pub fn from_ms(duration_ms: u64) -> Self {
        let mut hours = (Decimal::from(duration_ms) / Decimal::from(MS_PER_HOUR))
            .round_dp_with_strategy(FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero);
        hours.rescale(FRACTION_DIGITS);
        Self(hours)
    }

    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl Add for Hours {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Serialized as a decimal string (`"1.25"`) to keep it exact.
impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Converts a rounded duration to hours.
pub fn to_hours(duration_ms: u64) -> Hours {
    Hours::from_ms(duration_ms)
}
