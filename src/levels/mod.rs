//! Level detection pipeline stages.

pub mod calibrator;
pub mod engine;
pub mod extrema;
pub mod post_process;
pub mod similarity;
pub mod validator;

pub use calibrator::calibrate;
pub use engine::LevelEngine;
pub use extrema::{detect, detect_series};
pub use post_process::{cluster_levels, post_process};
pub use similarity::score;
pub use validator::validate;
