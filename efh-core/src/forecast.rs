use crate::error::{RecordError, Result};
use crate::target::{Target, TargetDescription};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use efh_utils::dates::parse_date_lenient;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named uncertainty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantileBand {
    /// 50% interval (0.25 - 0.75)
    Q50,
    /// 95% interval (0.025 - 0.975)
    Q95,
}

/// Which edge of a quantile band a value describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantileSide {
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantile {
    pub band: QuantileBand,
    pub side: QuantileSide,
}

impl Quantile {
    /// Map a quantile level onto a band edge. Only the four levels that
    /// bound the 50% and 95% intervals are accepted.
    pub fn from_level(level: f64) -> std::result::Result<Self, RecordError> {
        let (band, side) = match level {
            l if l == 0.025 => (QuantileBand::Q95, QuantileSide::Lower),
            l if l == 0.975 => (QuantileBand::Q95, QuantileSide::Upper),
            l if l == 0.25 => (QuantileBand::Q50, QuantileSide::Lower),
            l if l == 0.75 => (QuantileBand::Q50, QuantileSide::Upper),
            other => return Err(RecordError::UnknownQuantile(other.to_string())),
        };
        Ok(Quantile { band, side })
    }

    /// Parse a textual quantile level such as `"0.975"`.
    pub fn parse(level: &str) -> std::result::Result<Self, RecordError> {
        let level = level.trim();
        match level {
            "0.025" => Ok(Quantile::new(QuantileBand::Q95, QuantileSide::Lower)),
            "0.975" => Ok(Quantile::new(QuantileBand::Q95, QuantileSide::Upper)),
            "0.25" => Ok(Quantile::new(QuantileBand::Q50, QuantileSide::Lower)),
            "0.75" => Ok(Quantile::new(QuantileBand::Q50, QuantileSide::Upper)),
            other => Err(RecordError::UnknownQuantile(other.to_string())),
        }
    }

    pub fn new(band: QuantileBand, side: QuantileSide) -> Self {
        Quantile { band, side }
    }
}

/// What a forecast record value represents.
///
/// A quantile level is carried only by the `Quantile` variant, so a
/// quantile without a level (or a point with one) cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecordKind {
    Observed,
    Point,
    Quantile(Quantile),
}

impl RecordKind {
    /// Build the kind from the `type` column and the optional quantile column.
    pub fn parse(kind: &str, quantile: Option<&str>) -> std::result::Result<Self, RecordError> {
        match kind.trim() {
            "observed" => Ok(RecordKind::Observed),
            "point" => Ok(RecordKind::Point),
            "quantile" => {
                let level = quantile
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .ok_or(RecordError::MissingQuantile)?;
                Ok(RecordKind::Quantile(Quantile::parse(level)?))
            }
            other => Err(RecordError::UnknownKind(other.to_string())),
        }
    }

    /// Observed and point values are drawn as the forecast line.
    pub fn is_line(&self) -> bool {
        matches!(self, RecordKind::Observed | RecordKind::Point)
    }

    pub fn quantile(&self) -> Option<Quantile> {
        match self {
            RecordKind::Quantile(q) => Some(*q),
            _ => None,
        }
    }
}

/// One observed, point or quantile value of one model for one location,
/// target, reference date and horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub model: String,
    pub location: String,
    pub target: Target,
    pub kind: RecordKind,
    pub value: f64,
    /// Date the forecast file was submitted.
    pub forecast_date: NaiveDate,
    /// Date the forecast was issued ("timezero").
    pub reference_date: NaiveDate,
    /// Weeks ahead of the reference date; may be zero or negative.
    pub horizon_weeks: i32,
    /// Date the predicted or observed value applies to.
    pub target_end_date: NaiveDate,
}

impl ForecastRecord {
    /// True if this is a quantile record on the given band and side.
    pub fn is_quantile(&self, band: QuantileBand, side: QuantileSide) -> bool {
        self.kind.quantile() == Some(Quantile { band, side })
    }
}

/// One row of `forecasts_to_plot.csv`.
#[derive(Debug, Deserialize)]
struct RawForecastRow {
    model: String,
    location: String,
    forecast_date: String,
    timezero: String,
    target: String,
    target_end_date: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    quantile: String,
    value: String,
}

fn parse_field_date(field: &'static str, value: &str) -> std::result::Result<NaiveDate, RecordError> {
    parse_date_lenient(value).map_err(|_| RecordError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

impl TryFrom<RawForecastRow> for ForecastRecord {
    type Error = RecordError;

    fn try_from(row: RawForecastRow) -> std::result::Result<Self, Self::Error> {
        let description: TargetDescription = row.target.parse()?;
        let kind = RecordKind::parse(&row.kind, Some(&row.quantile))?;
        let value = row
            .value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RecordError::InvalidNumber {
                field: "value",
                value: row.value.clone(),
            })?;
        Ok(ForecastRecord {
            model: row.model,
            location: row.location,
            target: description.target,
            kind,
            value,
            forecast_date: parse_field_date("forecast_date", &row.forecast_date)?,
            reference_date: parse_field_date("timezero", &row.timezero)?,
            horizon_weeks: description.horizon_weeks,
            target_end_date: parse_field_date("target_end_date", &row.target_end_date)?,
        })
    }
}

/// Parse a forecast CSV with headers
/// `scenario,model,location,forecast_date,timezero,target,target_end_date,type,quantile,value`.
///
/// Rows that fail to parse are skipped and counted; the rest are returned.
pub fn parse_forecast_csv(csv_data: &str) -> Result<Vec<ForecastRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv_data.as_bytes());

    let mut records = Vec::new();
    let mut skipped = 0u32;
    for (index, result) in rdr.deserialize::<RawForecastRow>().enumerate() {
        let parsed = result
            .map_err(|e| e.to_string())
            .and_then(|row| ForecastRecord::try_from(row).map_err(|e| e.to_string()));
        match parsed {
            Ok(record) => records.push(record),
            Err(reason) => {
                skipped += 1;
                log::debug!("[EFH] loader: skipping forecast row {}: {}", index, reason);
            }
        }
    }
    log::info!(
        "[EFH] loader: Loaded {} forecast records, skipped {}",
        records.len(),
        skipped
    );
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct RawJsonTarget {
    end_date: String,
    time_ahead: i32,
    #[serde(rename = "type")]
    kind: String,
}

/// One item of the `data` array in `forecasts_to_plot.json`.
#[derive(Debug, Deserialize)]
struct RawJsonItem {
    forecast_date: String,
    location: String,
    model: String,
    quantile: Option<f64>,
    target: RawJsonTarget,
    timezero: String,
    #[serde(rename = "type")]
    kind: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct RawJsonBucket {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

impl TryFrom<RawJsonItem> for ForecastRecord {
    type Error = RecordError;

    fn try_from(item: RawJsonItem) -> std::result::Result<Self, Self::Error> {
        let kind = match item.kind.as_str() {
            "quantile" => {
                let level = item.quantile.ok_or(RecordError::MissingQuantile)?;
                RecordKind::Quantile(Quantile::from_level(level)?)
            }
            other => RecordKind::parse(other, None)?,
        };
        Ok(ForecastRecord {
            model: item.model,
            location: item.location,
            target: item.target.kind.parse()?,
            kind,
            value: item.value,
            forecast_date: parse_field_date("forecast_date", &item.forecast_date)?,
            reference_date: parse_field_date("timezero", &item.timezero)?,
            horizon_weeks: item.target.time_ahead,
            target_end_date: parse_field_date("target.end_date", &item.target.end_date)?,
        })
    }
}

/// Parse the nested JSON form `location -> target -> { availableDates, data }`.
///
/// Available dates are recomputed from the records when the dataset is
/// built, so only `data` is read here.
pub fn parse_forecast_json(json_data: &str) -> Result<Vec<ForecastRecord>> {
    let raw: HashMap<String, HashMap<String, RawJsonBucket>> = serde_json::from_str(json_data)?;

    let mut records = Vec::new();
    let mut skipped = 0u32;
    for bucket in raw.into_values().flat_map(HashMap::into_values) {
        for value in bucket.data {
            let parsed = serde_json::from_value::<RawJsonItem>(value)
                .map_err(|e| e.to_string())
                .and_then(|item| ForecastRecord::try_from(item).map_err(|e| e.to_string()));
            match parsed {
                Ok(record) => records.push(record),
                Err(reason) => {
                    skipped += 1;
                    log::debug!("[EFH] loader: skipping forecast item: {}", reason);
                }
            }
        }
    }
    log::info!(
        "[EFH] loader: Loaded {} forecast records from JSON, skipped {}",
        records.len(),
        skipped
    );
    Ok(records)
}
