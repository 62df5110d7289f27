//! The immutable raw data store: every forecast and truth record of a
//! session, grouped by location and target.

use crate::filter::DataFilter;
use crate::forecast::ForecastRecord;
use crate::location::LocationLookup;
use crate::model_settings::ModelSelection;
use crate::target::Target;
use crate::truth::{TruthRecord, TruthTable};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// All forecast records for one location and target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastBucket {
    /// Ordered by reference date, then horizon.
    pub records: Vec<ForecastRecord>,
    /// Distinct reference dates, most recent first.
    pub available_dates: Vec<NaiveDate>,
}

impl ForecastBucket {
    fn new(mut records: Vec<ForecastRecord>) -> Self {
        records.sort_by_key(|r| (r.reference_date, r.horizon_weeks));
        let available_dates = records
            .iter()
            .map(|r| r.reference_date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .collect();
        ForecastBucket {
            records,
            available_dates,
        }
    }
}

/// Snapshot loaded once per session. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    forecasts: HashMap<String, HashMap<Target, ForecastBucket>>,
    truth: TruthTable,
    locations: LocationLookup,
    model_selection: ModelSelection,
}

impl Dataset {
    pub fn new(forecasts: Vec<ForecastRecord>, truth: TruthTable) -> Self {
        let mut grouped: HashMap<String, HashMap<Target, Vec<ForecastRecord>>> = HashMap::new();
        for record in forecasts {
            grouped
                .entry(record.location.clone())
                .or_default()
                .entry(record.target)
                .or_default()
                .push(record);
        }
        let forecasts: HashMap<_, HashMap<_, _>> = grouped
            .into_iter()
            .map(|(location, by_target)| {
                let buckets = by_target
                    .into_iter()
                    .map(|(target, records)| (target, ForecastBucket::new(records)))
                    .collect();
                (location, buckets)
            })
            .collect();
        log::info!(
            "[EFH] dataset: {} forecast locations, {} truth locations",
            forecasts.len(),
            truth.len()
        );
        Dataset {
            forecasts,
            truth,
            locations: LocationLookup::default(),
            model_selection: ModelSelection::default(),
        }
    }

    pub fn with_locations(mut self, locations: LocationLookup) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_model_selection(mut self, model_selection: ModelSelection) -> Self {
        self.model_selection = model_selection;
        self
    }

    /// The forecast bucket selected by a filter. `None` when the location is
    /// unset or unknown, or has no forecasts for the target.
    pub fn forecast_bucket(&self, filter: &DataFilter) -> Option<&ForecastBucket> {
        let location = filter.location.as_deref()?;
        self.forecasts.get(location)?.get(&filter.target)
    }

    /// Truth records for a filter, ordered by date; empty when absent.
    pub fn truth(&self, filter: &DataFilter) -> &[TruthRecord] {
        filter
            .location
            .as_deref()
            .and_then(|location| self.truth.get(location))
            .and_then(|by_target| by_target.get(&filter.target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Truth records for every location for one target.
    pub fn truth_for_target(&self, target: Target) -> impl Iterator<Item = (&str, &[TruthRecord])> {
        self.truth.iter().filter_map(move |(location, by_target)| {
            by_target
                .get(&target)
                .map(|records| (location.as_str(), records.as_slice()))
        })
    }

    /// Distinct reference dates for a filter, most recent first.
    pub fn available_dates(&self, filter: &DataFilter) -> &[NaiveDate] {
        self.forecast_bucket(filter)
            .map(|bucket| bucket.available_dates.as_slice())
            .unwrap_or(&[])
    }

    pub fn locations(&self) -> &LocationLookup {
        &self.locations
    }

    pub fn model_selection(&self) -> &ModelSelection {
        &self.model_selection
    }

    /// Model names with forecasts for the filter's location and target, sorted.
    pub fn model_names_for(&self, filter: &DataFilter) -> BTreeSet<&str> {
        self.forecast_bucket(filter)
            .map(|bucket| bucket.records.iter().map(|r| r.model.as_str()).collect())
            .unwrap_or_default()
    }

    /// Every model name present in the dataset, sorted.
    pub fn model_names(&self) -> BTreeSet<&str> {
        self.forecasts
            .values()
            .flat_map(|by_target| by_target.values())
            .flat_map(|bucket| bucket.records.iter())
            .map(|r| r.model.as_str())
            .collect()
    }
}
