//! Support/resistance level detection for a single instrument.
//!
//! The pipeline runs leaf-first: the [`services::cache::BarSeriesCache`]
//! supplies daily bars, predefined levels are validated against them, the
//! validated levels calibrate the extrema prominence threshold, raw extrema
//! are post-processed into a bounded level set and finally scored against
//! the validated levels. [`levels::engine::LevelEngine`] wires the stages
//! together.

pub mod config;
pub mod error;
pub mod levels;
pub mod logging;
pub mod models;
pub mod services;

pub use error::LevelError;
