use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A predefined level that survived historical validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatedLevel {
    pub level: f64,
    pub touches: u32,
    pub reversals: u32,
}

/// A local extremum accepted by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub index: usize,
    pub price: f64,
    pub prominence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extrema {
    pub maxima: Vec<Extremum>,
    pub minima: Vec<Extremum>,
}

impl Extrema {
    pub fn is_empty(&self) -> bool {
        self.maxima.is_empty() && self.minima.is_empty()
    }

    pub fn maxima_prices(&self) -> Vec<f64> {
        self.maxima.iter().map(|e| e.price).collect()
    }

    pub fn minima_prices(&self) -> Vec<f64> {
        self.minima.iter().map(|e| e.price).collect()
    }
}

/// Post-processed output: the ranked level set plus the closest support below
/// and resistance above the current price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub levels: Vec<f64>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

/// Result of one full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelReport {
    pub symbol: String,
    pub price: f64,
    pub levels: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub validated: Vec<ValidatedLevel>,
    pub prominence: f64,
    /// Percentage of detected levels corroborated by validated ones.
    pub similarity: f64,
    pub bar_count: usize,
    /// Served from a cache entry older than the allowed age after a failed refresh.
    pub stale: bool,
    /// Too few bars for windowed detection; `levels` is empty.
    pub insufficient_data: bool,
    pub generated_at: DateTime<Utc>,
}

impl LevelReport {
    pub fn new(symbol: String, price: f64) -> Self {
        Self {
            symbol,
            price,
            levels: Vec::new(),
            support: None,
            resistance: None,
            validated: Vec::new(),
            prominence: 0.0,
            similarity: 0.0,
            bar_count: 0,
            stale: false,
            insufficient_data: false,
            generated_at: Utc::now(),
        }
    }

    pub fn with_level_set(mut self, set: LevelSet) -> Self {
        self.levels = set.levels;
        self.support = set.support;
        self.resistance = set.resistance;
        self
    }

    pub fn with_validated(mut self, validated: Vec<ValidatedLevel>) -> Self {
        self.validated = validated;
        self
    }

    pub fn support_distance_pct(&self) -> Option<f64> {
        self.support
            .map(|support| ((self.price - support) / self.price) * 100.0)
    }

    pub fn resistance_distance_pct(&self) -> Option<f64> {
        self.resistance
            .map(|resistance| ((resistance - self.price) / self.price) * 100.0)
    }
}
