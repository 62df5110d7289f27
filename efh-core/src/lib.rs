//! Core types and source parsers for forecast hub data.
//!
//! Forecast, truth and location sources are parsed once into typed records
//! and grouped into an immutable [`dataset::Dataset`]. Malformed rows are
//! skipped with a log entry; they never abort a load.

pub mod compression;
pub mod dataset;
pub mod error;
#[cfg(feature = "api")]
pub mod fetch;
pub mod filter;
pub mod forecast;
pub mod location;
pub mod model_settings;
pub mod settings;
pub mod target;
pub mod truth;
