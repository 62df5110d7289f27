//! The data view builder: raw dataset + filter + display settings in,
//! [`ChartDataView`] out.

use crate::colors::ColorAssignment;
use chrono::NaiveDate;
use efh_core::dataset::Dataset;
use efh_core::filter::DataFilter;
use efh_core::forecast::ForecastRecord;
use efh_core::settings::DisplaySettings;
use efh_core::truth::TruthRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// One model's records inside the active temporal window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastModelSeries {
    pub model: String,
    pub color: String,
    pub records: Vec<ForecastRecord>,
}

/// Snapshot consumed by the series projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataView {
    pub filter: DataFilter,
    pub display_settings: DisplaySettings,
    /// Ordered by model name.
    pub forecasts: Vec<ForecastModelSeries>,
    pub truth_data: Vec<TruthRecord>,
    /// Distinct reference dates, most recent first.
    pub available_forecast_dates: Vec<NaiveDate>,
}

impl ChartDataView {
    pub fn empty(filter: DataFilter, display_settings: DisplaySettings) -> Self {
        ChartDataView {
            filter,
            display_settings,
            forecasts: Vec::new(),
            truth_data: Vec::new(),
            available_forecast_dates: Vec::new(),
        }
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.forecasts.iter().map(|m| m.model.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty() && self.truth_data.is_empty()
    }
}

/// Builds chart data views. Owns the colour table, so one builder per
/// session keeps colours stable across rebuilds.
#[derive(Debug, Default)]
pub struct DataViewBuilder {
    colors: ColorAssignment,
}

impl DataViewBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colors(&self) -> &ColorAssignment {
        &self.colors
    }

    pub fn build(
        &mut self,
        dataset: &Dataset,
        filter: &DataFilter,
        settings: &DisplaySettings,
    ) -> ChartDataView {
        let Some(bucket) = dataset.forecast_bucket(filter) else {
            log::debug!(
                "[EFH] view: no data for location {:?}, target {}",
                filter.location,
                filter.target
            );
            return ChartDataView::empty(filter.clone(), *settings);
        };

        let mut by_model: BTreeMap<&str, Vec<ForecastRecord>> = BTreeMap::new();
        for record in &bucket.records {
            let records = by_model.entry(record.model.as_str()).or_default();
            if settings.display_mode.includes(record) {
                records.push(record.clone());
            }
        }

        let forecasts: Vec<ForecastModelSeries> = by_model
            .into_iter()
            .map(|(model, records)| ForecastModelSeries {
                model: model.to_string(),
                color: self.colors.pick(model).to_string(),
                records,
            })
            .collect();

        log::debug!(
            "[EFH] view: {} models, {} records in window",
            forecasts.len(),
            forecasts.iter().map(|m| m.records.len()).sum::<usize>()
        );

        ChartDataView {
            filter: filter.clone(),
            display_settings: *settings,
            forecasts,
            truth_data: dataset.truth(filter).to_vec(),
            available_forecast_dates: bucket.available_dates.clone(),
        }
    }
}
