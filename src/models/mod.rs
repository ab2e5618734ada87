//! Shared data models spanning the pipeline stages.

pub mod bar;
pub mod levels;

pub use bar::Bar;
pub use levels::{Extrema, Extremum, LevelReport, LevelSet, ValidatedLevel};
