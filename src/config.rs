//! Runtime configuration and level-detection policy constants.
//!
//! Everything is read from environment variables (a `.env` file is loaded by
//! the binary through `dotenvy`). Tuning constants live in [`LevelPolicy`] so
//! the algorithms never carry magic numbers of their own.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_HYPERLIQUID_URL: &str = "https://api.hyperliquid.xyz";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Deployment environment name (`ENVIRONMENT`, defaults to `sandbox`).
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_hyperliquid_url() -> String {
    env::var("HYPERLIQUID_API_URL").unwrap_or_else(|_| DEFAULT_HYPERLIQUID_URL.to_string())
}

/// Which price series feeds the extrema detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Resistances from maxima of highs, supports from minima of lows.
    #[default]
    HighLow,
    /// Both sides from the close series.
    Close,
}

impl FromStr for DetectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high_low" | "highlow" | "split" => Ok(DetectionMode::HighLow),
            "close" => Ok(DetectionMode::Close),
            other => Err(format!("unknown detection mode '{other}'")),
        }
    }
}

/// Optional post-processing stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcessOptions {
    /// Inject predefined levels that no detected level corroborates.
    pub use_predefined_blend: bool,
    /// Drop levels without above-average traded volume around them.
    pub use_volume_weighting: bool,
}

/// Tuning constants for every pipeline stage. Fractions are of price
/// (0.01 = 1%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelPolicy {
    pub window_size: usize,
    pub min_distance: usize,
    pub touch_tolerance: f64,
    pub min_touches: u32,
    pub min_reversals: u32,
    pub calibration_proximity: f64,
    pub prominence_floor: f64,
    pub range_low_multiplier: f64,
    pub range_high_multiplier: f64,
    pub blend_tolerance: f64,
    pub volume_proximity: f64,
    pub volume_multiple: f64,
    pub cluster_tolerance: f64,
    pub max_levels: usize,
    pub match_tolerance: f64,
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self {
            window_size: 20,
            min_distance: 30,
            touch_tolerance: 0.01,
            min_touches: 2,
            min_reversals: 2,
            calibration_proximity: 0.02,
            prominence_floor: 0.02,
            range_low_multiplier: 0.3,
            range_high_multiplier: 2.5,
            blend_tolerance: 0.05,
            volume_proximity: 0.01,
            volume_multiple: 2.0,
            cluster_tolerance: 0.01,
            max_levels: 20,
            match_tolerance: 0.02,
        }
    }
}

impl LevelPolicy {
    /// Fewest bars that fit one full detection window.
    pub fn min_bars(&self) -> usize {
        self.window_size * 2 + 1
    }

    /// Reject settings the stages cannot run with.
    pub fn check(&self) -> Result<(), ConfigError> {
        let invalid = |value: String, reason: &str| ConfigError::Invalid {
            key: "LEVEL_POLICY_FILE",
            value,
            reason: reason.to_string(),
        };

        if self.window_size == 0 {
            return Err(invalid("window_size = 0".into(), "window must be at least one bar"));
        }
        if self.max_levels == 0 {
            return Err(invalid("max_levels = 0".into(), "at least one level must be kept"));
        }
        let fractions = [
            ("touch_tolerance", self.touch_tolerance),
            ("calibration_proximity", self.calibration_proximity),
            ("prominence_floor", self.prominence_floor),
            ("blend_tolerance", self.blend_tolerance),
            ("volume_proximity", self.volume_proximity),
            ("volume_multiple", self.volume_multiple),
            ("cluster_tolerance", self.cluster_tolerance),
            ("match_tolerance", self.match_tolerance),
        ];
        if let Some((name, value)) = fractions
            .iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(invalid(format!("{name} = {value}"), "must be finite and non-negative"));
        }
        let (low, high) = (self.range_low_multiplier, self.range_high_multiplier);
        if !(low.is_finite() && high.is_finite() && low > 0.0 && low < high) {
            return Err(invalid(
                format!("range = {low}..{high}"),
                "range multipliers must satisfy 0 < low < high",
            ));
        }
        Ok(())
    }

    /// Inclusive price band a level must fall in to be reported.
    pub fn price_range(&self, current_price: f64) -> (f64, f64) {
        (
            current_price * self.range_low_multiplier,
            current_price * self.range_high_multiplier,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub symbol: String,
    pub hyperliquid_url: String,
    pub http_timeout: Duration,
    pub fetch_retries: usize,
    pub cache_max_age: Duration,
    pub lookback_days: u32,
    pub detection_mode: DetectionMode,
    pub options: PostProcessOptions,
    pub predefined_levels: Vec<f64>,
    pub policy: LevelPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: "BTC".to_string(),
            hyperliquid_url: DEFAULT_HYPERLIQUID_URL.to_string(),
            http_timeout: Duration::from_secs(10),
            fetch_retries: 3,
            cache_max_age: Duration::from_secs(3600),
            lookback_days: 365,
            detection_mode: DetectionMode::default(),
            options: PostProcessOptions::default(),
            predefined_levels: Vec::new(),
            policy: LevelPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(symbol) = lookup("LEVELS_SYMBOL") {
            config.symbol = symbol.trim().to_uppercase();
        }
        if let Some(url) = lookup("HYPERLIQUID_API_URL") {
            config.hyperliquid_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "HTTP_TIMEOUT_SECONDS")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_var::<usize>(&lookup, "FETCH_RETRIES")? {
            config.fetch_retries = retries;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "CACHE_MAX_AGE_SECONDS")? {
            config.cache_max_age = Duration::from_secs(secs);
        }
        if let Some(days) = parse_var::<u32>(&lookup, "LOOKBACK_DAYS")? {
            if days == 0 {
                return Err(ConfigError::Invalid {
                    key: "LOOKBACK_DAYS",
                    value: days.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            config.lookback_days = days;
        }
        if let Some(mode) = parse_var::<DetectionMode>(&lookup, "DETECTION_MODE")? {
            config.detection_mode = mode;
        }
        if let Some(flag) = parse_bool(&lookup, "USE_PREDEFINED_BLEND")? {
            config.options.use_predefined_blend = flag;
        }
        if let Some(flag) = parse_bool(&lookup, "USE_VOLUME_WEIGHTING")? {
            config.options.use_volume_weighting = flag;
        }

        if let Some(path) = lookup("LEVEL_POLICY_FILE") {
            config.policy = load_policy_file(PathBuf::from(path))?;
        }

        config.predefined_levels = if let Some(path) = lookup("PREDEFINED_LEVELS_FILE") {
            load_levels_file(PathBuf::from(path))?
        } else if let Some(list) = lookup("PREDEFINED_LEVELS") {
            parse_level_list(&list)?
        } else {
            Vec::new()
        };

        Ok(config)
    }
}

/// Parse a comma separated list such as `"60000, 65000,72000"`.
pub fn parse_level_list(list: &str) -> Result<Vec<f64>, ConfigError> {
    let levels = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|e| ConfigError::Invalid {
                key: "PREDEFINED_LEVELS",
                value: s.to_string(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    normalize_levels(levels)
}

/// Load a JSON array of prices.
pub fn load_levels_file(path: PathBuf) -> Result<Vec<f64>, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let levels: Vec<f64> =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json { path, source })?;
    normalize_levels(levels)
}

/// Load a JSON object of [`LevelPolicy`] overrides; omitted keys keep their
/// defaults.
pub fn load_policy_file(path: PathBuf) -> Result<LevelPolicy, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let policy: LevelPolicy =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json { path, source })?;
    policy.check()?;
    Ok(policy)
}

/// Reject non-positive prices, then sort and dedup.
fn normalize_levels(mut levels: Vec<f64>) -> Result<Vec<f64>, ConfigError> {
    if let Some(bad) = levels.iter().find(|l| !l.is_finite() || **l <= 0.0) {
        return Err(ConfigError::Invalid {
            key: "PREDEFINED_LEVELS",
            value: bad.to_string(),
            reason: "levels must be finite and strictly positive".to_string(),
        });
    }
    levels.sort_by(f64::total_cmp);
    levels.dedup();
    Ok(levels)
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                key,
                value,
                reason: e.to_string(),
            }),
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<bool>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid {
                key,
                value,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}
