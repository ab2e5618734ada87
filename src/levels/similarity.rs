//! Detected vs. validated level similarity.

use crate::config::LevelPolicy;
use crate::models::ValidatedLevel;

/// Percentage (0-100) of detected levels lying within `match_tolerance` of at
/// least one validated level. Zero when either side is empty.
pub fn score(detected: &[f64], validated: &[ValidatedLevel], policy: &LevelPolicy) -> f64 {
    if detected.is_empty() || validated.is_empty() {
        return 0.0;
    }

    let matched = detected
        .iter()
        .filter(|&&d| {
            validated
                .iter()
                .any(|v| (d - v.level).abs() / v.level <= policy.match_tolerance)
        })
        .count();

    100.0 * matched as f64 / detected.len() as f64
}
