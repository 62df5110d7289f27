//! Display settings state machine.
//!
//! States are the confidence band times the display mode. Mode switches
//! remember the values of the inactive mode, so switching back restores the
//! previous forecast date or horizon. Forecast date playback lives here too,
//! because it drives the by-date forecast date.

use crate::command::StepDirection;
use crate::config::DashboardConfig;
use crate::playback::{Playback, PlaybackState};
use chrono::NaiveDate;
use efh_core::forecast::QuantileBand;
use efh_core::settings::{
    ByDateMode, ByHorizonMode, DisplayMode, DisplayModeKind, DisplaySettings, SettingsError, Weeks,
};
use efh_utils::dates::difference_in_days;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct DisplaySettingsState {
    settings: DisplaySettings,
    /// Date shown in by-date mode, kept while by-horizon is active.
    forecast_date: NaiveDate,
    /// Whether `forecast_date` was picked by the user.
    date_chosen: bool,
    weeks_shown: Weeks,
    weeks_ahead: Weeks,
    tolerance_days: i64,
    playback: Playback,
}

impl DisplaySettingsState {
    /// By-date settings at `fallback_date` until forecast dates are known.
    pub fn new(config: &DashboardConfig, fallback_date: NaiveDate) -> Self {
        DisplaySettingsState {
            settings: DisplaySettings {
                confidence_band: config.default_confidence_band,
                display_mode: DisplayMode::ByDate(ByDateMode {
                    forecast_date: fallback_date,
                    weeks_shown: config.default_weeks,
                }),
            },
            forecast_date: fallback_date,
            date_chosen: false,
            weeks_shown: config.default_weeks,
            weeks_ahead: config.default_weeks,
            tolerance_days: config.date_tolerance_days,
            playback: Playback::new(config.playback_interval),
        }
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn next_playback_tick(&self) -> Option<Instant> {
        self.playback.next_tick()
    }

    pub fn change_confidence_interval(&mut self, band: Option<QuantileBand>) -> bool {
        if self.settings.confidence_band == band {
            return false;
        }
        self.settings.confidence_band = band;
        true
    }

    pub fn change_display_mode(&mut self, kind: DisplayModeKind, available: &[NaiveDate]) -> bool {
        match kind {
            DisplayModeKind::ByDate => self.switch_to_by_date(available),
            DisplayModeKind::ByHorizon => self.switch_to_by_horizon(),
        }
    }

    /// Cancels playback and shows one horizon across all reference dates.
    pub fn switch_to_by_horizon(&mut self) -> bool {
        self.stop_playback();
        if self.settings.display_mode.kind() == DisplayModeKind::ByHorizon {
            return false;
        }
        self.settings.display_mode = DisplayMode::ByHorizon(ByHorizonMode {
            weeks_ahead: self.weeks_ahead,
        });
        true
    }

    /// Shows one reference date: the last chosen one while it is still
    /// available, otherwise the most recent available date.
    pub fn switch_to_by_date(&mut self, available: &[NaiveDate]) -> bool {
        if self.settings.display_mode.kind() == DisplayModeKind::ByDate {
            return false;
        }
        let keep = self.date_chosen && available.contains(&self.forecast_date);
        if !keep {
            if let Some(latest) = available.first() {
                self.forecast_date = *latest;
            }
        }
        self.settings.display_mode = DisplayMode::ByDate(ByDateMode {
            forecast_date: self.forecast_date,
            weeks_shown: self.weeks_shown,
        });
        true
    }

    /// Snap to the available date closest to `date`, if it is at most the
    /// tolerance away. Ties go to the more recent date. A no-op outside
    /// by-date mode.
    pub fn change_forecast_date(&mut self, date: NaiveDate, available: &[NaiveDate]) -> bool {
        if self.settings.display_mode.kind() != DisplayModeKind::ByDate {
            return false;
        }
        let closest = available
            .iter()
            .copied()
            .min_by_key(|d| difference_in_days(*d, date).abs());
        match closest {
            Some(closest) if difference_in_days(closest, date).abs() <= self.tolerance_days => {
                self.date_chosen = true;
                self.apply_forecast_date(closest)
            }
            _ => {
                log::debug!("[EFH] settings: no forecast date near {}", date);
                false
            }
        }
    }

    /// Set the by-date forecast date exactly.
    pub fn set_forecast_date(&mut self, date: NaiveDate) -> Result<bool, SettingsError> {
        self.require(DisplayModeKind::ByDate, "forecastDate")?;
        Ok(self.apply_forecast_date(date))
    }

    pub fn change_horizon_weeks_ahead(&mut self, weeks: Weeks) -> Result<bool, SettingsError> {
        let DisplayMode::ByHorizon(mode) = &mut self.settings.display_mode else {
            return Err(SettingsError::ModeMismatch {
                field: "weeksAhead",
                expected: DisplayModeKind::ByHorizon,
            });
        };
        self.weeks_ahead = weeks;
        let changed = mode.weeks_ahead != weeks;
        mode.weeks_ahead = weeks;
        Ok(changed)
    }

    pub fn change_date_weeks_shown(&mut self, weeks: Weeks) -> Result<bool, SettingsError> {
        let DisplayMode::ByDate(mode) = &mut self.settings.display_mode else {
            return Err(SettingsError::ModeMismatch {
                field: "weeksShown",
                expected: DisplayModeKind::ByDate,
            });
        };
        self.weeks_shown = weeks;
        let changed = mode.weeks_shown != weeks;
        mode.weeks_shown = weeks;
        Ok(changed)
    }

    /// Keep the by-date forecast date valid for a new set of available dates.
    ///
    /// An unavailable date moves to the most recent available one; nothing
    /// changes while playing or when no dates are available.
    pub fn reconcile_available_dates(&mut self, available: &[NaiveDate]) -> bool {
        if self.playback.is_playing() || available.contains(&self.forecast_date) {
            return false;
        }
        let Some(latest) = available.first().copied() else {
            return false;
        };
        self.date_chosen = false;
        match self.settings.display_mode {
            DisplayMode::ByDate(_) => self.apply_forecast_date(latest),
            DisplayMode::ByHorizon(_) => {
                self.forecast_date = latest;
                false
            }
        }
    }

    /// The neighbouring available date, if the current date is available.
    pub fn neighbour_date(&self, direction: StepDirection, available: &[NaiveDate]) -> Option<NaiveDate> {
        let DisplayMode::ByDate(mode) = &self.settings.display_mode else {
            return None;
        };
        let index = available.iter().position(|d| *d == mode.forecast_date)?;
        // available dates are sorted most recent first
        let target = match direction {
            StepDirection::Older => index.checked_add(1)?,
            StepDirection::Newer => index.checked_sub(1)?,
        };
        available.get(target).copied()
    }

    /// Manual stepping is disabled while playback is active.
    pub fn can_step(&self, direction: StepDirection, available: &[NaiveDate]) -> bool {
        !self.playback.is_active() && self.neighbour_date(direction, available).is_some()
    }

    pub fn step_forecast_date(&mut self, direction: StepDirection, available: &[NaiveDate]) -> bool {
        if !self.can_step(direction, available) {
            return false;
        }
        match self.neighbour_date(direction, available) {
            Some(date) => {
                self.date_chosen = true;
                self.apply_forecast_date(date)
            }
            None => false,
        }
    }

    /// Start, pause or resume playback. Only possible in by-date mode;
    /// starting needs an older date to step to.
    pub fn toggle_playback(&mut self, now: Instant, available: &[NaiveDate]) -> bool {
        let DisplayMode::ByDate(mode) = self.settings.display_mode else {
            return false;
        };
        match self.playback.state() {
            PlaybackState::Playing { .. } => self.playback.pause(),
            PlaybackState::Paused { .. } => self.playback.start(mode.forecast_date, now),
            PlaybackState::Idle => {
                if self.neighbour_date(StepDirection::Older, available).is_none() {
                    return false;
                }
                self.playback.start(mode.forecast_date, now);
            }
        }
        log::debug!("[EFH] settings: playback {:?}", self.playback.state());
        true
    }

    /// Stop playback and restore the date shown before it started.
    pub fn stop_playback(&mut self) -> bool {
        let Some(before) = self.playback.stop() else {
            return false;
        };
        log::debug!("[EFH] settings: playback stopped, restoring {}", before);
        self.forecast_date = before;
        if let DisplayMode::ByDate(mode) = &mut self.settings.display_mode {
            mode.forecast_date = before;
        }
        true
    }

    /// Advance playback if its timer is due. Reaching the oldest date stops
    /// playback and restores the starting date. Returns true if the forecast
    /// date changed.
    pub fn tick_playback(&mut self, now: Instant, available: &[NaiveDate]) -> bool {
        if !self.playback.is_due(now) {
            return false;
        }
        match self.neighbour_date(StepDirection::Older, available) {
            Some(date) => {
                self.playback.advance(now);
                self.apply_forecast_date(date)
            }
            None => self.stop_playback(),
        }
    }

    fn require(&self, expected: DisplayModeKind, field: &'static str) -> Result<(), SettingsError> {
        if self.settings.display_mode.kind() == expected {
            Ok(())
        } else {
            Err(SettingsError::ModeMismatch { field, expected })
        }
    }

    fn apply_forecast_date(&mut self, date: NaiveDate) -> bool {
        self.forecast_date = date;
        match &mut self.settings.display_mode {
            DisplayMode::ByDate(mode) if mode.forecast_date != date => {
                mode.forecast_date = date;
                true
            }
            _ => false,
        }
    }
}
