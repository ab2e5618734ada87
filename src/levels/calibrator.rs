//! Prominence calibration from validated levels.

use crate::config::LevelPolicy;
use crate::models::{Bar, ValidatedLevel};

/// Derive the extrema prominence threshold (a fraction of price).
///
/// For each validated level, the one-bar-ahead close-to-close swings at bars
/// trading within `calibration_proximity` of the level are averaged; the
/// per-level averages are averaged again. The result never drops below
/// `prominence_floor`, and an empty validated set yields the floor itself.
pub fn calibrate(validated: &[ValidatedLevel], series: &[Bar], policy: &LevelPolicy) -> f64 {
    let floor = policy.prominence_floor;
    if validated.is_empty() {
        return floor;
    }

    let per_level: Vec<f64> = validated
        .iter()
        .filter_map(|v| mean_swing_near(v.level, series, policy.calibration_proximity))
        .collect();

    if per_level.is_empty() {
        return floor;
    }

    let raw = per_level.iter().sum::<f64>() / per_level.len() as f64;
    if raw.is_finite() {
        raw.max(floor)
    } else {
        floor
    }
}

/// Mean of `|close[i+1] - close[i]| / close[i]` over bars near `level`;
/// `None` when no bar qualifies.
fn mean_swing_near(level: f64, series: &[Bar], proximity: f64) -> Option<f64> {
    let swings: Vec<f64> = series
        .windows(2)
        .filter(|pair| pair[0].near_level(level, proximity))
        .map(|pair| (pair[1].close - pair[0].close).abs() / pair[0].close)
        .collect();

    if swings.is_empty() {
        None
    } else {
        Some(swings.iter().sum::<f64>() / swings.len() as f64)
    }
}
