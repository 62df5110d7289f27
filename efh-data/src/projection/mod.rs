//! Series projection: converts a [`ChartDataView`] into chart-ready series.
//!
//! Two independent algorithms exist, one per display mode. Both share the
//! truth series, the y-axis label and the x-axis extent computed here.

pub mod by_date;
pub mod by_horizon;
pub mod tooltip;

use crate::view::{ChartDataView, ForecastModelSeries};
use crate::visibility::ModelVisibility;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use efh_core::settings::{DisplayMode, DisplayModeKind};
use efh_core::target::Target;
use efh_utils::dates::start_of_day;
use serde::Serialize;
use tooltip::{TooltipContent, TooltipSample};

/// Name of the observed-data series, also used to spot it in tooltips.
pub const TRUTH_SERIES_NAME: &str = "truth-data";
pub const TRUTH_COLOR: &str = "#333";
pub const FORECAST_DATE_SERIES_ID: &str = "forecast-date-line";
pub const CONFIDENCE_LOWER_SUFFIX: &str = "-confidence-lower";
pub const CONFIDENCE_UPPER_SUFFIX: &str = "-confidence-upper";
pub const CONFIDENCE_AREA_SUFFIX: &str = "-ci";
/// Opacity of confidence band fills.
pub const BAND_OPACITY: f64 = 0.4;

/// Days added after the latest truth date to leave room for forecasts.
const X_AXIS_PADDING_DAYS: i64 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeriesRole {
    Truth,
    ForecastDate,
    Forecast,
    ConfidenceLower,
    ConfidenceUpper,
    /// Invisible carrier of by-horizon confidence area points.
    ConfidenceArea,
}

/// One sample of a series. `y == None` breaks the line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: NaiveDateTime,
    pub y: Option<f64>,
    /// Confidence range shown with the point in tooltips.
    pub band: Option<(f64, f64)>,
}

impl SeriesPoint {
    pub fn new(x: NaiveDateTime, y: f64) -> Self {
        SeriesPoint {
            x,
            y: Some(y),
            band: None,
        }
    }

    pub fn gap(x: NaiveDateTime) -> Self {
        SeriesPoint {
            x,
            y: None,
            band: None,
        }
    }

    pub fn on_date(date: NaiveDate, y: f64) -> Self {
        SeriesPoint::new(start_of_day(date), y)
    }

    pub fn is_gap(&self) -> bool {
        self.y.is_none()
    }
}

/// Horizontal position of an area corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AxisPosition {
    /// Left edge of the visible axis.
    Min,
    At(NaiveDateTime),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaCorner {
    pub x: AxisPosition,
    /// `None` spans the full vertical extent.
    pub y: Option<f64>,
}

/// A shaded rectangle. A missing corner is left for the renderer to omit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkArea {
    pub start: Option<AreaCorner>,
    pub end: Option<AreaCorner>,
}

/// A labelled vertical line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkLine {
    pub x: NaiveDateTime,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub id: String,
    pub name: String,
    pub color: String,
    pub role: SeriesRole,
    /// Series sharing a stack are drawn on top of each other.
    pub stack: Option<String>,
    /// Fill opacity of the area under the series or of its mark areas.
    pub fill_opacity: Option<f64>,
    /// Drawn without line or symbols; still sampled by tooltips.
    pub hidden: bool,
    pub points: Vec<SeriesPoint>,
    pub mark_areas: Vec<MarkArea>,
    pub mark_line: Option<MarkLine>,
}

impl ChartSeries {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>, role: SeriesRole) -> Self {
        ChartSeries {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            role,
            stack: None,
            fill_opacity: None,
            hidden: false,
            points: Vec::new(),
            mark_areas: Vec::new(),
            mark_line: None,
        }
    }

    /// First non-gap point at exactly `x`.
    pub fn point_at(&self, x: NaiveDateTime) -> Option<&SeriesPoint> {
        self.points.iter().find(|p| p.x == x && !p.is_gap())
    }
}

/// Everything the chart renderer needs for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartProjection {
    pub target: Target,
    pub mode: DisplayModeKind,
    pub y_axis_label: String,
    /// Latest truth date plus five weeks; `None` without truth data.
    pub x_axis_max: Option<NaiveDate>,
    pub series: Vec<ChartSeries>,
}

impl ChartProjection {
    pub fn series_by_id(&self, id: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.id == id)
    }

    /// Samples of every data series at one x position, the way an
    /// axis-triggered tooltip collects them.
    pub fn samples_at(&self, x: NaiveDateTime) -> Vec<TooltipSample> {
        self.series
            .iter()
            .filter(|s| s.role != SeriesRole::ForecastDate)
            .filter_map(|s| {
                s.point_at(x).and_then(|p| {
                    p.y.map(|value| TooltipSample {
                        series_id: s.id.clone(),
                        series_name: s.name.clone(),
                        axis_value: x,
                        value,
                        band: p.band,
                        marker: s.color.clone(),
                    })
                })
            })
            .collect()
    }

    /// Tooltip content for a hover group, formatted for the active mode.
    pub fn tooltip(&self, samples: &[TooltipSample]) -> Option<TooltipContent> {
        match self.mode {
            DisplayModeKind::ByDate => tooltip::by_date_tooltip(samples, self.target),
            DisplayModeKind::ByHorizon => tooltip::by_horizon_tooltip(samples, self.target),
        }
    }
}

/// Project a view into chart series, drawing only visible models.
pub fn project(view: &ChartDataView, visibility: &ModelVisibility) -> ChartProjection {
    let mut series = Vec::new();
    let mut x_axis_max = None;

    if let Some(truth) = truth_series(view) {
        x_axis_max = view
            .truth_data
            .iter()
            .map(|r| r.date)
            .max()
            .map(|d| d + TimeDelta::days(X_AXIS_PADDING_DAYS));
        series.push(truth);
    }

    let models: Vec<&ForecastModelSeries> = view
        .forecasts
        .iter()
        .filter(|m| visibility.is_visible(&m.model))
        .collect();

    let band = view.display_settings.confidence_band;
    match &view.display_settings.display_mode {
        DisplayMode::ByDate(mode) => series.extend(by_date::project(&view.filter, mode, band, &models)),
        DisplayMode::ByHorizon(mode) => {
            series.extend(by_horizon::project(&view.filter, mode, band, &models))
        }
    }

    log::debug!(
        "[EFH] projection: {} series for {} visible models",
        series.len(),
        models.len()
    );

    ChartProjection {
        target: view.filter.target,
        mode: view.display_settings.display_mode.kind(),
        y_axis_label: view.filter.target.label().to_string(),
        x_axis_max,
        series,
    }
}

fn truth_series(view: &ChartDataView) -> Option<ChartSeries> {
    if view.truth_data.is_empty() {
        return None;
    }
    let mut series = ChartSeries::new(
        format!("{}-{}", view.filter.series_prefix(), TRUTH_SERIES_NAME),
        TRUTH_SERIES_NAME,
        TRUTH_COLOR,
        SeriesRole::Truth,
    );
    series.points = view
        .truth_data
        .iter()
        .map(|r| SeriesPoint::on_date(r.date, r.value))
        .collect();
    Some(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::{by_date, date};
    use efh_core::filter::DataFilter;
    use efh_core::settings::Weeks;
    use efh_core::truth::TruthRecord;

    #[test]
    fn test_truth_series_and_axis() {
        let mut view = ChartDataView::empty(
            DataFilter::new(Some("DE".to_string()), Target::Death),
            by_date(date(2023, 5, 6), Weeks::ONE),
        );
        view.truth_data = vec![
            TruthRecord { date: date(2023, 4, 29), value: 10.0 },
            TruthRecord { date: date(2023, 5, 6), value: 12.0 },
        ];
        let projection = project(&view, &ModelVisibility::new());
        assert_eq!(projection.y_axis_label, "Deaths");
        assert_eq!(projection.x_axis_max, Some(date(2023, 6, 10)));

        let truth = projection.series_by_id("death-DE-truth-data").unwrap();
        assert_eq!(truth.name, TRUTH_SERIES_NAME);
        assert_eq!(truth.color, TRUTH_COLOR);
        assert_eq!(truth.points.len(), 2);
    }

    #[test]
    fn test_empty_view_projects_without_forecasts() {
        let view = ChartDataView::empty(DataFilter::default(), by_date(date(2023, 5, 6), Weeks::ONE));
        let projection = project(&view, &ModelVisibility::new());
        assert_eq!(projection.x_axis_max, None);
        assert!(projection
            .series
            .iter()
            .all(|s| s.role == SeriesRole::ForecastDate));
    }
}
