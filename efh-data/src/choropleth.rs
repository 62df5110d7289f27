//! Per-location values for the map: the latest observed value of the
//! active target and its incidence per 100,000 inhabitants.

use chrono::NaiveDate;
use efh_core::dataset::Dataset;
use efh_core::target::Target;
use serde::Serialize;

const INCIDENCE_BASE: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationValue {
    pub id: String,
    pub name: String,
    /// `None` when the location has no truth data for the target.
    pub date: Option<NaiveDate>,
    pub value: f64,
    /// `None` when the population is unknown or zero.
    pub incidence: Option<f64>,
}

/// Latest value per location known to the lookup, in lookup order.
pub fn location_values(dataset: &Dataset, target: Target) -> Vec<LocationValue> {
    let latest: std::collections::HashMap<&str, (NaiveDate, f64)> = dataset
        .truth_for_target(target)
        .filter_map(|(location, records)| {
            records
                .iter()
                .max_by_key(|r| r.date)
                .map(|r| (location, (r.date, r.value)))
        })
        .collect();

    dataset
        .locations()
        .items()
        .iter()
        .map(|item| {
            let (date, value) = match latest.get(item.id.as_str()) {
                Some((date, value)) => (Some(*date), *value),
                None => (None, 0.0),
            };
            let incidence =
                (item.population > 0).then(|| value / item.population as f64 * INCIDENCE_BASE);
            LocationValue {
                id: item.id.clone(),
                name: item.name.clone(),
                date,
                value,
                incidence,
            }
        })
        .collect()
}
