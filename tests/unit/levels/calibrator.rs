//! Unit tests for prominence calibration

use crate::test_utils::{assert_close, double_bottom_series, flat_series};
use levelwatch::config::LevelPolicy;
use levelwatch::levels::{calibrate, validate};
use levelwatch::models::ValidatedLevel;

#[test]
fn test_empty_validated_returns_floor() {
    let policy = LevelPolicy::default();
    assert_eq!(calibrate(&[], &double_bottom_series(), &policy), policy.prominence_floor);
    assert_eq!(calibrate(&[], &[], &policy), policy.prominence_floor);
}

#[test]
fn test_swings_around_validated_level_raise_threshold() {
    let policy = LevelPolicy::default();
    let series = double_bottom_series();
    let validated = validate(&[100.0], &series, &policy);

    let prominence = calibrate(&validated, &series, &policy);
    // Mean of the 1.5%, 5.0% and 3.8% swings following each dip bar.
    assert_close(prominence, 0.0341, 0.0005);
    assert!(prominence > policy.prominence_floor);
}

#[test]
fn test_quiet_market_stays_at_floor() {
    let policy = LevelPolicy::default();
    let series = flat_series(120, 100.0);
    let validated = vec![ValidatedLevel {
        level: 100.0,
        touches: 10,
        reversals: 10,
    }];
    assert_eq!(calibrate(&validated, &series, &policy), policy.prominence_floor);
}

#[test]
fn test_level_far_from_any_bar_stays_at_floor() {
    let policy = LevelPolicy::default();
    let validated = vec![ValidatedLevel {
        level: 500.0,
        touches: 2,
        reversals: 2,
    }];
    assert_eq!(
        calibrate(&validated, &double_bottom_series(), &policy),
        policy.prominence_floor
    );
}

#[test]
fn test_custom_floor_is_respected() {
    let policy = LevelPolicy {
        prominence_floor: 0.05,
        ..LevelPolicy::default()
    };
    let series = double_bottom_series();
    let validated = validate(&[100.0], &series, &policy);
    assert_eq!(calibrate(&validated, &series, &policy), 0.05);
}
