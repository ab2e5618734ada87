//! Daily price bar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// One day of price action. `time` is the unix day (days since 1970-01-01).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume: Option<f64>,
}

impl Bar {
    pub fn new(time: i64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// `low <= close <= high`, all prices finite and strictly positive.
    pub fn is_sane(&self) -> bool {
        let finite = self.high.is_finite() && self.low.is_finite() && self.close.is_finite();
        finite
            && self.low > 0.0
            && self.low <= self.close
            && self.close <= self.high
            && self.volume.map_or(true, |v| v.is_finite() && v >= 0.0)
    }

    /// True when either extreme of the bar lies within `tolerance` (a fraction)
    /// of `level`.
    pub fn near_level(&self, level: f64, tolerance: f64) -> bool {
        (self.low - level).abs() / level <= tolerance
            || (self.high - level).abs() / level <= tolerance
    }
}

/// Unix day containing the given instant.
pub fn unix_day(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(SECONDS_PER_DAY)
}
