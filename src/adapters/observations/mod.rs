//! Heart-rate observation sources
//!
//! - [`synthetic`] - Random readings within a range, for demos and load tests
//! - [`series`] - Readings recorded in per-patient series files, and the
//!   generator that writes them

pub mod series;
pub mod synthetic;

pub use series::{format_reading, parse_reading, SeriesSource, SeriesWriter};
pub use synthetic::SyntheticSource;
