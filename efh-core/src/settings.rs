//! Display settings: confidence band and temporal display mode.

use crate::forecast::{ForecastRecord, QuantileBand};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by display settings transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("weeks must be between 1 and 4, got {0}")]
    InvalidWeeks(u8),

    /// A field of the inactive display mode was set.
    #[error("current display mode isn't {expected}, thus can't set '{field}'")]
    ModeMismatch {
        field: &'static str,
        expected: DisplayModeKind,
    },
}

/// Number of weeks shown or ahead, always between 1 and 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8")]
pub struct Weeks(u8);

impl Weeks {
    pub const ONE: Weeks = Weeks(1);
    pub const TWO: Weeks = Weeks(2);
    pub const THREE: Weeks = Weeks(3);
    pub const FOUR: Weeks = Weeks(4);

    pub fn new(weeks: u8) -> Result<Self, SettingsError> {
        match weeks {
            1..=4 => Ok(Weeks(weeks)),
            other => Err(SettingsError::InvalidWeeks(other)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The weeks as a forecast horizon.
    pub fn as_horizon(self) -> i32 {
        i32::from(self.0)
    }
}

impl Default for Weeks {
    fn default() -> Self {
        Weeks::TWO
    }
}

impl TryFrom<u8> for Weeks {
    type Error = SettingsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Weeks::new(value)
    }
}

/// View fixed at one reference date, showing horizons up to `weeks_shown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByDateMode {
    pub forecast_date: NaiveDate,
    pub weeks_shown: Weeks,
}

/// View fixed at one horizon, showing every reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByHorizonMode {
    pub weeks_ahead: Weeks,
}

/// The temporal projection of the chart. Mode-specific fields only exist
/// on their own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DisplayMode {
    ByDate(ByDateMode),
    ByHorizon(ByHorizonMode),
}

/// Tag of a [`DisplayMode`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayModeKind {
    ByDate,
    ByHorizon,
}

impl fmt::Display for DisplayModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayModeKind::ByDate => f.write_str("by-date"),
            DisplayModeKind::ByHorizon => f.write_str("by-horizon"),
        }
    }
}

impl DisplayMode {
    pub fn kind(&self) -> DisplayModeKind {
        match self {
            DisplayMode::ByDate(_) => DisplayModeKind::ByDate,
            DisplayMode::ByHorizon(_) => DisplayModeKind::ByHorizon,
        }
    }

    pub fn forecast_date(&self) -> Option<NaiveDate> {
        match self {
            DisplayMode::ByDate(mode) => Some(mode.forecast_date),
            DisplayMode::ByHorizon(_) => None,
        }
    }

    /// Whether a record falls into the temporal window of this mode.
    ///
    /// By date keeps the exact reference date only; there is no closest-date
    /// fallback at this stage.
    pub fn includes(&self, record: &ForecastRecord) -> bool {
        match self {
            DisplayMode::ByDate(mode) => {
                record.reference_date == mode.forecast_date
                    && record.horizon_weeks <= mode.weeks_shown.as_horizon()
            }
            DisplayMode::ByHorizon(mode) => record.horizon_weeks <= mode.weeks_ahead.as_horizon(),
        }
    }
}

/// Confidence band and display mode chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// `None` hides confidence bands.
    pub confidence_band: Option<QuantileBand>,
    pub display_mode: DisplayMode,
}

impl DisplaySettings {
    /// Settings derived from the available dates: by date at the most recent
    /// one (or `fallback_date` when there are none), two weeks shown, 95% band.
    pub fn default_for(available_dates: &[NaiveDate], fallback_date: NaiveDate) -> Self {
        DisplaySettings {
            confidence_band: Some(QuantileBand::Q95),
            display_mode: DisplayMode::ByDate(ByDateMode {
                forecast_date: available_dates.first().copied().unwrap_or(fallback_date),
                weeks_shown: Weeks::default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::RecordKind;
    use crate::target::Target;

    fn record(reference: NaiveDate, horizon: i32) -> ForecastRecord {
        ForecastRecord {
            model: "model-a".to_string(),
            location: "DE".to_string(),
            target: Target::Cases,
            kind: RecordKind::Point,
            value: 1.0,
            forecast_date: reference,
            reference_date: reference,
            horizon_weeks: horizon,
            target_end_date: reference,
        }
    }

    #[test]
    fn test_weeks_bounds() {
        assert!(Weeks::new(0).is_err());
        assert_eq!(Weeks::new(4).unwrap(), Weeks::FOUR);
        assert_eq!(Weeks::try_from(5), Err(SettingsError::InvalidWeeks(5)));
        assert_eq!(Weeks::default().get(), 2);
    }

    #[test]
    fn test_by_date_window_is_exact_match() {
        let issued = NaiveDate::from_ymd_opt(2023, 5, 6).unwrap();
        let shown = NaiveDate::from_ymd_opt(2023, 5, 13).unwrap();
        let mode = DisplayMode::ByDate(ByDateMode {
            forecast_date: shown,
            weeks_shown: Weeks::TWO,
        });
        assert!(!mode.includes(&record(issued, 1)));
        assert!(mode.includes(&record(shown, 2)));
        assert!(!mode.includes(&record(shown, 3)));
        assert!(mode.includes(&record(shown, -1)));
    }

    #[test]
    fn test_by_horizon_window_ignores_reference_date() {
        let mode = DisplayMode::ByHorizon(ByHorizonMode {
            weeks_ahead: Weeks::ONE,
        });
        let issued = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
        assert!(mode.includes(&record(issued, 0)));
        assert!(mode.includes(&record(issued, 1)));
        assert!(!mode.includes(&record(issued, 2)));
    }

    #[test]
    fn test_default_settings_use_most_recent_date() {
        let dates = [
            NaiveDate::from_ymd_opt(2023, 5, 20).unwrap(),
            NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
        ];
        let fallback = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let settings = DisplaySettings::default_for(&dates, fallback);
        assert_eq!(settings.display_mode.forecast_date(), Some(dates[0]));
        assert_eq!(settings.confidence_band, Some(QuantileBand::Q95));
        assert_eq!(
            DisplaySettings::default_for(&[], fallback).display_mode.forecast_date(),
            Some(fallback)
        );
    }
}
