//! Local extrema detection with a prominence filter.

use crate::config::{DetectionMode, LevelPolicy};
use crate::models::{Bar, Extrema, Extremum};

/// Raw detector output split by side, before post-processing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLevels {
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
}

/// Scan `values` for local maxima and minima.
///
/// Index `i` is examined only when the full window `[i - window_size,
/// i + window_size]` fits. A value equal to the window maximum is a candidate
/// maximum with prominence `(v - min(values[i - min_distance..i])) / v`; a
/// value equal to the window minimum is a candidate minimum with prominence
/// `(max(values[i..i + min_distance]) - v) / v`. Candidates whose prominence
/// reaches `prominence` are accepted. Flat windows produce no candidate, so
/// no index is ever reported on both sides.
pub fn detect(values: &[f64], window_size: usize, min_distance: usize, prominence: f64) -> Extrema {
    let mut extrema = Extrema::default();
    if window_size == 0 || values.len() < window_size * 2 + 1 {
        return extrema;
    }

    for i in window_size..values.len() - window_size {
        let value = values[i];
        if !value.is_finite() || value <= 0.0 {
            continue;
        }

        let (window_min, window_max) = min_max(&values[i - window_size..=i + window_size]);
        if window_min == window_max {
            continue;
        }

        if value == window_max {
            let start = i.saturating_sub(min_distance);
            let base = min_max(&values[start..i]).0.min(value);
            let p = (value - base) / value;
            if p >= prominence {
                extrema.maxima.push(Extremum {
                    index: i,
                    price: value,
                    prominence: p,
                });
            }
        } else if value == window_min {
            let end = (i + min_distance).min(values.len());
            let peak = min_max(&values[i..end]).1.max(value);
            let p = (peak - value) / value;
            if p >= prominence {
                extrema.minima.push(Extremum {
                    index: i,
                    price: value,
                    prominence: p,
                });
            }
        }
    }

    extrema
}

/// Run the detector over a bar series in the requested mode.
pub fn detect_series(
    series: &[Bar],
    mode: DetectionMode,
    prominence: f64,
    policy: &LevelPolicy,
) -> RawLevels {
    let run = |values: Vec<f64>| detect(&values, policy.window_size, policy.min_distance, prominence);

    match mode {
        DetectionMode::HighLow => {
            let highs = run(series.iter().map(|b| b.high).collect());
            let lows = run(series.iter().map(|b| b.low).collect());
            RawLevels {
                supports: lows.minima_prices(),
                resistances: highs.maxima_prices(),
            }
        }
        DetectionMode::Close => {
            let closes = run(series.iter().map(|b| b.close).collect());
            RawLevels {
                supports: closes.minima_prices(),
                resistances: closes.maxima_prices(),
            }
        }
    }
}

/// `(min, max)` of a slice; `(+inf, -inf)` when empty.
fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
