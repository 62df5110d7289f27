//! The recomputation coordinator.

use crate::command::{Command, LegendPreset};
use crate::config::DashboardConfig;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::filter::FilterState;
use crate::settings::DisplaySettingsState;
use chrono::NaiveDate;
use efh_core::dataset::Dataset;
use efh_core::filter::DataFilter;
use efh_core::settings::DisplaySettings;
use efh_data::colors::ColorAssignment;
use efh_data::projection::{project, ChartProjection};
use efh_data::view::{ChartDataView, DataViewBuilder};
use efh_data::visibility::ModelVisibility;
use std::time::Instant;

/// Owns all dashboard state and publishes views.
///
/// Commands mutate state and arm the debouncer; [`Dashboard::poll`] runs
/// playback and, once the debounce deadline has passed, rebuilds the view
/// and projection from the current dataset, filter and settings together.
pub struct Dashboard {
    config: DashboardConfig,
    dataset: Option<Dataset>,
    filter: FilterState,
    settings: DisplaySettingsState,
    visibility: ModelVisibility,
    builder: DataViewBuilder,
    debouncer: Debouncer,
    view: Option<ChartDataView>,
    projection: Option<ChartProjection>,
    revision: u64,
}

impl Dashboard {
    /// `fallback_date` is shown in by-date mode until forecast dates are
    /// known, usually today.
    pub fn new(config: DashboardConfig, fallback_date: NaiveDate) -> Self {
        Dashboard {
            settings: DisplaySettingsState::new(&config, fallback_date),
            debouncer: Debouncer::new(config.debounce),
            filter: FilterState::default(),
            visibility: ModelVisibility::new(),
            builder: DataViewBuilder::new(),
            dataset: None,
            view: None,
            projection: None,
            revision: 0,
            config,
        }
    }

    /// Install the session's dataset. Resolves the default location and the
    /// default visible models.
    pub fn load_dataset(&mut self, dataset: Dataset, now: Instant) {
        self.filter
            .resolve_default_location(self.config.default_location.as_deref(), dataset.locations());
        if !self.visibility.has_user_choice() {
            self.visibility
                .set_defaults(dataset.model_selection().default_model_names.iter().cloned());
        }
        log::info!(
            "[EFH] dashboard: dataset loaded, {} models, {} locations",
            dataset.model_names().len(),
            dataset.locations().items().len()
        );
        self.dataset = Some(dataset);
        self.debouncer.arm(now);
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn filter(&self) -> &DataFilter {
        self.filter.current()
    }

    pub fn display_settings(&self) -> &DisplaySettings {
        self.settings.settings()
    }

    pub fn settings_state(&self) -> &DisplaySettingsState {
        &self.settings
    }

    pub fn visibility(&self) -> &ModelVisibility {
        &self.visibility
    }

    pub fn colors(&self) -> &ColorAssignment {
        self.builder.colors()
    }

    /// Latest published view; `None` before the first recomputation.
    pub fn view(&self) -> Option<&ChartDataView> {
        self.view.as_ref()
    }

    pub fn projection(&self) -> Option<&ChartProjection> {
        self.projection.as_ref()
    }

    /// Number of recomputations so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Available forecast dates for the current filter, most recent first.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.dataset
            .as_ref()
            .map(|d| d.available_dates(self.filter.current()).to_vec())
            .unwrap_or_default()
    }

    /// Earliest instant at which [`Dashboard::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debouncer.deadline(), self.settings.next_playback_tick()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Apply one command. Mode/field mismatches are returned as errors and
    /// leave the state untouched.
    pub fn dispatch(&mut self, command: Command, now: Instant) -> Result<()> {
        log::debug!("[EFH] dashboard: {:?}", command);
        let available = self.available_dates();
        let changed = match command {
            Command::ChangeLocation(location) => {
                self.filter.change_location(&location) && self.filter_changed()
            }
            Command::ChangeTarget(target) => self.filter.change_target(target) && self.filter_changed(),
            Command::ChangeConfidenceInterval(band) => self.settings.change_confidence_interval(band),
            Command::ChangeDisplayMode(kind) => self.settings.change_display_mode(kind, &available),
            Command::ChangeForecastDate(date) => self.settings.change_forecast_date(date, &available),
            Command::ChangeHorizonWeeksAhead(weeks) => self.settings.change_horizon_weeks_ahead(weeks)?,
            Command::ChangeDateWeeksShown(weeks) => self.settings.change_date_weeks_shown(weeks)?,
            Command::ToggleModelVisibility(model) => {
                let models = self.model_names();
                self.visibility
                    .toggle(&model, models.iter().map(String::as_str));
                true
            }
            Command::ChangeVisibleModels(models) => {
                self.visibility.change(models);
                true
            }
            Command::ApplyLegendPreset(preset) => {
                self.apply_legend_preset(preset);
                true
            }
            Command::TogglePlayback => self.settings.toggle_playback(now, &available),
            Command::StopPlayback => self.settings.stop_playback(),
            Command::StepForecastDate(direction) => {
                self.settings.step_forecast_date(direction, &available)
            }
        };
        if changed {
            self.debouncer.arm(now);
        }
        Ok(())
    }

    /// Run due timers. Returns true if a new view was published.
    pub fn poll(&mut self, now: Instant) -> bool {
        let available = self.available_dates();
        if self.settings.tick_playback(now, &available) {
            self.debouncer.arm(now);
        }
        if self.debouncer.poll(now) {
            self.recompute();
            return true;
        }
        false
    }

    /// Recompute immediately, dropping any pending deadline.
    pub fn flush(&mut self) {
        self.debouncer.cancel();
        self.recompute();
    }

    /// Models of the current filter, independent of the last published view.
    fn model_names(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|d| {
                d.model_names_for(self.filter.current())
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A new location or target invalidates the playback sequence; stopping
    /// restores the pre-playback date, which the next recomputation reconciles.
    fn filter_changed(&mut self) -> bool {
        if self.settings.stop_playback() {
            log::debug!("[EFH] dashboard: filter changed, playback stopped");
        }
        true
    }

    fn apply_legend_preset(&mut self, preset: LegendPreset) {
        match preset {
            LegendPreset::All => {
                let models = self.model_names();
                self.visibility.show_all(models.iter().map(String::as_str));
            }
            LegendPreset::None => self.visibility.hide_all(),
            LegendPreset::Ensemble => {
                let ensemble = self
                    .dataset
                    .as_ref()
                    .map(|d| d.model_selection().ensemble_model_names.clone())
                    .unwrap_or_default();
                self.visibility.ensemble_only(&ensemble);
            }
        }
    }

    fn recompute(&mut self) {
        let Some(dataset) = self.dataset.as_ref() else {
            log::debug!("[EFH] dashboard: no dataset yet, skipping recomputation");
            return;
        };
        let filter = self.filter.current().clone();
        self.settings
            .reconcile_available_dates(dataset.available_dates(&filter));
        let settings = *self.settings.settings();

        let view = self.builder.build(dataset, &filter, &settings);
        let projection = project(&view, &self.visibility);
        self.revision += 1;
        log::debug!(
            "[EFH] dashboard: revision {} with {} models, {} series",
            self.revision,
            view.forecasts.len(),
            projection.series.len()
        );
        self.view = Some(view);
        self.projection = Some(projection);
    }
}
