/// Error types for dashboard commands
use efh_core::settings::SettingsError;
use thiserror::Error;

/// A command that violates the display settings contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("Invalid display settings change: {0}")]
    Settings(#[from] SettingsError),
}

/// Type alias for Results using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;
