//! Dashboard state and the recomputation coordinator.
//!
//! User interactions arrive as [`Command`]s. Each one is applied to the
//! filter or display settings state immediately, and arms a debounce
//! deadline. When the deadline passes without further commands the
//! [`Dashboard`] rebuilds the chart data view and its projection from one
//! consistent snapshot of dataset, filter and settings.
//!
//! Time is passed in explicitly (`Instant`), so the event loop driving the
//! dashboard decides how to wait.

pub mod command;
pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod playback;
pub mod settings;

pub use command::{Command, LegendPreset, StepDirection};
pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use error::DashboardError;
