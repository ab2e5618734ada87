//! Unit tests for configuration loading

use levelwatch::config::{parse_level_list, Config, ConfigError, DetectionMode, LevelPolicy};
use std::collections::HashMap;
use std::time::Duration;

fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_defaults_without_variables() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.symbol, "BTC");
    assert_eq!(config.lookback_days, 365);
    assert_eq!(config.cache_max_age, Duration::from_secs(3600));
    assert_eq!(config.detection_mode, DetectionMode::HighLow);
    assert!(!config.options.use_predefined_blend);
    assert!(!config.options.use_volume_weighting);
    assert!(config.predefined_levels.is_empty());
}

#[test]
fn test_policy_defaults() {
    let policy = LevelPolicy::default();
    assert_eq!(policy.window_size, 20);
    assert_eq!(policy.min_distance, 30);
    assert_eq!(policy.max_levels, 20);
    assert_eq!(policy.min_bars(), 41);
    assert_eq!(policy.price_range(100.0), (30.0, 250.0));
}

#[test]
fn test_overrides_from_variables() {
    let config = config_from(&[
        ("LEVELS_SYMBOL", "eth"),
        ("HYPERLIQUID_API_URL", "http://localhost:9000/"),
        ("CACHE_MAX_AGE_SECONDS", "60"),
        ("LOOKBACK_DAYS", "90"),
        ("DETECTION_MODE", "close"),
        ("USE_PREDEFINED_BLEND", "true"),
        ("USE_VOLUME_WEIGHTING", "1"),
        ("PREDEFINED_LEVELS", "3000, 2500,3000,4000"),
    ])
    .unwrap();

    assert_eq!(config.symbol, "ETH");
    assert_eq!(config.hyperliquid_url, "http://localhost:9000");
    assert_eq!(config.cache_max_age, Duration::from_secs(60));
    assert_eq!(config.lookback_days, 90);
    assert_eq!(config.detection_mode, DetectionMode::Close);
    assert!(config.options.use_predefined_blend);
    assert!(config.options.use_volume_weighting);
    assert_eq!(config.predefined_levels, vec![2500.0, 3000.0, 4000.0]);
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(matches!(
        config_from(&[("LOOKBACK_DAYS", "zero")]),
        Err(ConfigError::Invalid { key: "LOOKBACK_DAYS", .. })
    ));
    assert!(config_from(&[("LOOKBACK_DAYS", "0")]).is_err());
    assert!(config_from(&[("DETECTION_MODE", "median")]).is_err());
    assert!(config_from(&[("USE_VOLUME_WEIGHTING", "maybe")]).is_err());
}

#[test]
fn test_non_positive_levels_are_rejected() {
    assert!(parse_level_list("100, -5").is_err());
    assert!(parse_level_list("0").is_err());
    assert!(parse_level_list("abc").is_err());
    assert_eq!(parse_level_list("").unwrap(), Vec::<f64>::new());
}

#[test]
fn test_levels_file_is_loaded() {
    let path = std::env::temp_dir().join(format!("levelwatch-levels-{}.json", std::process::id()));
    std::fs::write(&path, "[65000, 60000.5]").unwrap();

    let config = config_from(&[("PREDEFINED_LEVELS_FILE", path.to_str().unwrap())]).unwrap();
    assert_eq!(config.predefined_levels, vec![60000.5, 65000.0]);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_levels_file_is_an_error() {
    let result = config_from(&[("PREDEFINED_LEVELS_FILE", "/nonexistent/levels.json")]);
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_policy_file_overrides_defaults() {
    let path = std::env::temp_dir().join(format!("levelwatch-policy-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "window_size": 10, "cluster_tolerance": 0.02 }"#).unwrap();

    let config = config_from(&[("LEVEL_POLICY_FILE", path.to_str().unwrap())]).unwrap();
    assert_eq!(config.policy.window_size, 10);
    assert_eq!(config.policy.cluster_tolerance, 0.02);
    assert_eq!(config.policy.min_bars(), 21);
    // Unlisted keys keep their defaults.
    assert_eq!(config.policy.max_levels, 20);
    assert_eq!(config.policy.match_tolerance, 0.02);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_unusable_policy_file_is_rejected() {
    let path = std::env::temp_dir().join(format!("levelwatch-bad-policy-{}.json", std::process::id()));

    std::fs::write(&path, r#"{ "window_size": 0 }"#).unwrap();
    let result = config_from(&[("LEVEL_POLICY_FILE", path.to_str().unwrap())]);
    assert!(matches!(result, Err(ConfigError::Invalid { key: "LEVEL_POLICY_FILE", .. })));

    std::fs::write(&path, r#"{ "range_low_multiplier": 3.0 }"#).unwrap();
    assert!(config_from(&[("LEVEL_POLICY_FILE", path.to_str().unwrap())]).is_err());

    std::fs::write(&path, r#"{ "window_size": "wide" }"#).unwrap();
    let result = config_from(&[("LEVEL_POLICY_FILE", path.to_str().unwrap())]);
    assert!(matches!(result, Err(ConfigError::Json { .. })));

    std::fs::remove_file(&path).ok();
}
