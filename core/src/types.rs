//! Shared primitive types used across the compliance core.

use serde::{Serialize, Serializer};
use std::fmt;

/// Stable farmer key, e.g. `F1001`.
pub type FarmerId = String;

/// Stable transaction key, e.g. `T00001`.
pub type TransactionId = String;

/// Currency amount in rupees.
pub type Amount = f64;

/// Calendar-year bucket a transaction falls into.
/// Unparsable or missing dates land in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum YearPartition {
    Year(i32),
    Unknown,
}

impl fmt::Display for YearPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for YearPartition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Round to two decimals, half away from zero (half-up for the
/// non-negative amounts this crate deals in).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `100 * numerator / denominator` rounded to two decimals; 0 when the
/// denominator is zero.
pub fn to_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    round2(numerator * 100.0 / denominator)
}
