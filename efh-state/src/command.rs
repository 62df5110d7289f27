//! Commands that mutate dashboard state.

use chrono::NaiveDate;
use efh_core::forecast::QuantileBand;
use efh_core::settings::{DisplayModeKind, Weeks};
use efh_core::target::Target;

/// Direction of forecast date stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// Previous (older) forecast date.
    Older,
    /// Next (more recent) forecast date.
    Newer,
}

/// One-click legend selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPreset {
    All,
    None,
    /// Only the models making up the hub ensemble.
    Ensemble,
}

/// A discrete state transition requested by the user.
///
/// Every command takes effect immediately on the state; the resulting view
/// is recomputed once the debounce deadline passes.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ChangeLocation(String),
    ChangeTarget(Target),
    /// `None` hides confidence bands.
    ChangeConfidenceInterval(Option<QuantileBand>),
    ChangeDisplayMode(DisplayModeKind),
    /// Snap to the closest available date within the tolerance. Ignored
    /// outside by-date mode.
    ChangeForecastDate(NaiveDate),
    /// Only valid in by-horizon mode.
    ChangeHorizonWeeksAhead(Weeks),
    /// Only valid in by-date mode.
    ChangeDateWeeksShown(Weeks),
    ToggleModelVisibility(String),
    ChangeVisibleModels(Vec<String>),
    ApplyLegendPreset(LegendPreset),
    /// Start, pause or resume forecast date playback.
    TogglePlayback,
    /// Stop playback and restore the date shown before it started.
    StopPlayback,
    StepForecastDate(StepDirection),
}
