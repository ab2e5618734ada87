//! Predefined level validation against historical touches and reversals.

use crate::config::LevelPolicy;
use crate::models::{Bar, ValidatedLevel};

/// Count touches and reversals of each level over adjacent bar pairs and keep
/// the levels that meet both minimums. Output is ascending by level.
///
/// A pair touches a level when the level lies inside the pair's combined
/// low/high envelope widened by `touch_tolerance`. A touching pair is a
/// reversal when the close strictly crosses the level between the two bars.
pub fn validate(levels: &[f64], series: &[Bar], policy: &LevelPolicy) -> Vec<ValidatedLevel> {
    if levels.is_empty() || series.len() < 2 {
        return Vec::new();
    }

    let mut validated: Vec<ValidatedLevel> = levels
        .iter()
        .map(|&level| touch_stats(level, series, policy.touch_tolerance))
        .filter(|v| v.touches >= policy.min_touches && v.reversals >= policy.min_reversals)
        .collect();

    validated.sort_by(|a, b| a.level.total_cmp(&b.level));
    validated
}

/// Raw counts for one level, without the retention thresholds.
pub fn touch_stats(level: f64, series: &[Bar], tolerance: f64) -> ValidatedLevel {
    let mut touches = 0;
    let mut reversals = 0;

    for pair in series.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let low = prev.low.min(curr.low) * (1.0 - tolerance);
        let high = prev.high.max(curr.high) * (1.0 + tolerance);
        if level < low || level > high {
            continue;
        }
        touches += 1;

        let crossed_up = prev.close < level && curr.close > level;
        let crossed_down = prev.close > level && curr.close < level;
        if crossed_up || crossed_down {
            reversals += 1;
        }
    }

    ValidatedLevel {
        level,
        touches,
        reversals,
    }
}
