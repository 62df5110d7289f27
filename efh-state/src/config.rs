use efh_core::forecast::QuantileBand;
use efh_core::settings::Weeks;
use std::time::Duration;

/// Pipeline tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Quiet period before a recomputation fires.
    pub debounce: Duration,
    /// Delay between two playback steps.
    pub playback_interval: Duration,
    pub default_confidence_band: Option<QuantileBand>,
    /// Initial weeks shown (by date) and weeks ahead (by horizon).
    pub default_weeks: Weeks,
    /// Maximum distance in days when snapping to an available forecast date.
    pub date_tolerance_days: i64,
    /// Location selected after load; the first location by name otherwise.
    pub default_location: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            debounce: Duration::from_millis(50),
            playback_interval: Duration::from_secs(1),
            default_confidence_band: Some(QuantileBand::Q95),
            default_weeks: Weeks::TWO,
            date_tolerance_days: 7,
            default_location: None,
        }
    }
}
