//! By-date projection: one reference date, several horizons.
//!
//! Every model gets a line plus a lower and an upper band series. The upper
//! band stores `upper - lower` and is stacked on the lower one, so the
//! renderer fills exactly the band between the two quantiles.

use super::{
    AreaCorner, AxisPosition, ChartSeries, MarkArea, MarkLine, SeriesPoint, SeriesRole,
    BAND_OPACITY, CONFIDENCE_LOWER_SUFFIX, CONFIDENCE_UPPER_SUFFIX, FORECAST_DATE_SERIES_ID,
};
use crate::view::ForecastModelSeries;
use efh_core::filter::DataFilter;
use efh_core::forecast::{QuantileBand, QuantileSide};
use efh_core::settings::ByDateMode;
use efh_utils::dates::{format_date, previous_reporting_saturday, start_of_day};

const MARKER_COLOR: &str = "#555";

pub(crate) fn project(
    filter: &DataFilter,
    mode: &ByDateMode,
    band: Option<QuantileBand>,
    models: &[&ForecastModelSeries],
) -> Vec<ChartSeries> {
    let mut series = vec![forecast_date_marker(mode)];
    for model in models {
        series.extend(model_series(filter, band, model));
    }
    series
}

/// Vertical line at the corrected forecast date, with the past shaded.
fn forecast_date_marker(mode: &ByDateMode) -> ChartSeries {
    let corrected = previous_reporting_saturday(mode.forecast_date);
    let x = start_of_day(corrected);
    let mut marker = ChartSeries::new(
        FORECAST_DATE_SERIES_ID,
        FORECAST_DATE_SERIES_ID,
        MARKER_COLOR,
        SeriesRole::ForecastDate,
    );
    marker.mark_line = Some(MarkLine {
        x,
        label: format_date(&corrected),
    });
    marker.mark_areas.push(MarkArea {
        start: Some(AreaCorner {
            x: AxisPosition::Min,
            y: None,
        }),
        end: Some(AreaCorner {
            x: AxisPosition::At(x),
            y: None,
        }),
    });
    marker
}

fn model_series(
    filter: &DataFilter,
    band: Option<QuantileBand>,
    model: &ForecastModelSeries,
) -> [ChartSeries; 3] {
    let mut line = Vec::new();
    let mut lower = Vec::new();
    let mut upper = Vec::new();

    for record in &model.records {
        let x = start_of_day(record.target_end_date);
        if record.kind.is_line() {
            line.push(SeriesPoint::new(x, record.value));
            // zero-width band at the anchor
            if record.horizon_weeks == 0 {
                lower.push(SeriesPoint::new(x, record.value));
                upper.push(SeriesPoint::new(x, 0.0));
            }
        }

        let (Some(band), Some(quantile)) = (band, record.kind.quantile()) else {
            continue;
        };
        if quantile.band != band {
            continue;
        }
        match quantile.side {
            QuantileSide::Lower => lower.push(SeriesPoint::new(x, record.value)),
            QuantileSide::Upper => {
                let lower_value = model
                    .records
                    .iter()
                    .find(|r| {
                        r.is_quantile(band, QuantileSide::Lower)
                            && r.horizon_weeks == record.horizon_weeks
                    })
                    .map_or(0.0, |r| r.value);
                upper.push(SeriesPoint::new(x, record.value - lower_value));
            }
        }
    }

    let id = format!("{}-{}", filter.series_prefix(), model.model);
    let stack = format!("confidence-band - {}", model.model);

    let mut line_series = ChartSeries::new(id.clone(), &model.model, &model.color, SeriesRole::Forecast);
    line_series.points = line;

    let mut lower_series = ChartSeries::new(
        format!("{}{}", id, CONFIDENCE_LOWER_SUFFIX),
        &model.model,
        &model.color,
        SeriesRole::ConfidenceLower,
    );
    lower_series.stack = Some(stack.clone());
    lower_series.points = lower;

    let mut upper_series = ChartSeries::new(
        format!("{}{}", id, CONFIDENCE_UPPER_SUFFIX),
        &model.model,
        &model.color,
        SeriesRole::ConfidenceUpper,
    );
    upper_series.stack = Some(stack);
    upper_series.fill_opacity = Some(BAND_OPACITY);
    upper_series.points = upper;

    [line_series, lower_series, upper_series]
}

#[cfg(test)]
mod tests {
    use crate::projection::{project, SeriesRole, FORECAST_DATE_SERIES_ID};
    use crate::view::tests::{by_date, date, quantile, record};
    use crate::view::{ChartDataView, ForecastModelSeries};
    use crate::visibility::ModelVisibility;
    use efh_core::filter::DataFilter;
    use efh_core::forecast::{QuantileBand, QuantileSide, RecordKind};
    use efh_core::settings::Weeks;
    use efh_core::target::Target;
    use efh_core::truth::TruthRecord;
    use efh_utils::dates::start_of_day;

    fn view_with(records: Vec<efh_core::forecast::ForecastRecord>) -> ChartDataView {
        let mut view = ChartDataView::empty(
            DataFilter::new(Some("DE".to_string()), Target::Cases),
            by_date(date(2023, 5, 10), Weeks::TWO),
        );
        view.forecasts.push(ForecastModelSeries {
            model: "model-a".to_string(),
            color: "rgb(101,179,46)".to_string(),
            records,
        });
        view
    }

    #[test]
    fn test_marker_at_corrected_date() {
        let projection = project(&view_with(Vec::new()), &ModelVisibility::new());
        let marker = projection.series_by_id(FORECAST_DATE_SERIES_ID).unwrap();
        let line = marker.mark_line.as_ref().unwrap();
        assert_eq!(line.x, start_of_day(date(2023, 5, 6)));
        assert_eq!(line.label, "2023-05-06");
        assert_eq!(marker.mark_areas.len(), 1);
    }

    #[test]
    fn test_upper_band_is_stacked_difference() {
        let d = date(2023, 5, 10);
        let view = view_with(vec![
            record("model-a", RecordKind::Observed, d, 0, 8.0),
            record("model-a", RecordKind::Point, d, 1, 20.0),
            record("model-a", quantile(QuantileBand::Q95, QuantileSide::Lower), d, 1, 10.0),
            record("model-a", quantile(QuantileBand::Q95, QuantileSide::Upper), d, 1, 25.0),
            record("model-a", quantile(QuantileBand::Q50, QuantileSide::Upper), d, 1, 22.0),
        ]);
        let projection = project(&view, &ModelVisibility::new());

        let line = projection.series_by_id("cases-DE-model-a").unwrap();
        assert_eq!(line.points.len(), 2);

        let lower = projection.series_by_id("cases-DE-model-a-confidence-lower").unwrap();
        let upper = projection.series_by_id("cases-DE-model-a-confidence-upper").unwrap();
        assert_eq!(lower.stack, upper.stack);
        assert_eq!(lower.stack.as_deref(), Some("confidence-band - model-a"));
        assert!(lower.fill_opacity.is_none());
        assert!(upper.fill_opacity.is_some());

        // anchor seeded at horizon 0, then the quantile pair
        assert_eq!(lower.points.iter().map(|p| p.y).collect::<Vec<_>>(), vec![Some(8.0), Some(10.0)]);
        assert_eq!(upper.points.iter().map(|p| p.y).collect::<Vec<_>>(), vec![Some(0.0), Some(15.0)]);
    }

    #[test]
    fn test_upper_without_lower_counts_lower_as_zero() {
        let d = date(2023, 5, 10);
        let view = view_with(vec![record(
            "model-a",
            quantile(QuantileBand::Q95, QuantileSide::Upper),
            d,
            2,
            40.0,
        )]);
        let projection = project(&view, &ModelVisibility::new());
        let upper = projection.series_by_id("cases-DE-model-a-confidence-upper").unwrap();
        assert_eq!(upper.points[0].y, Some(40.0));
    }

    #[test]
    fn test_no_band_selected() {
        let d = date(2023, 5, 10);
        let mut view = view_with(vec![
            record("model-a", quantile(QuantileBand::Q95, QuantileSide::Lower), d, 1, 10.0),
            record("model-a", quantile(QuantileBand::Q95, QuantileSide::Upper), d, 1, 25.0),
        ]);
        view.display_settings.confidence_band = None;
        let projection = project(&view, &ModelVisibility::new());
        let lower = projection.series_by_id("cases-DE-model-a-confidence-lower").unwrap();
        assert!(lower.points.is_empty());
    }

    #[test]
    fn test_tooltip_reconstructs_band() {
        let d = date(2023, 5, 10);
        let mut view = view_with(vec![
            record("model-a", RecordKind::Point, d, 1, 20.0),
            record("model-a", quantile(QuantileBand::Q95, QuantileSide::Lower), d, 1, 10.0),
            record("model-a", quantile(QuantileBand::Q95, QuantileSide::Upper), d, 1, 25.0),
        ]);
        view.truth_data = vec![TruthRecord {
            date: date(2023, 5, 17),
            value: 1234.0,
        }];
        let projection = project(&view, &ModelVisibility::new());

        let samples = projection.samples_at(start_of_day(date(2023, 5, 17)));
        assert_eq!(samples.len(), 4);
        let content = projection.tooltip(&samples).unwrap();
        assert_eq!(content.header, "2023-05-17");
        assert_eq!(content.truth.as_ref().unwrap().label, "Cases");
        assert_eq!(content.lines.len(), 1);
        assert_eq!(content.lines[0].range, Some((10.0, 25.0)));
        let text = content.to_string();
        assert!(text.contains("model-a: 20 (10 - 25)"));
        assert!(text.find("Cases: 1,234").unwrap() < text.find("model-a").unwrap());
    }

    #[test]
    fn test_hidden_models_are_not_projected() {
        let d = date(2023, 5, 10);
        let view = view_with(vec![record("model-a", RecordKind::Point, d, 1, 20.0)]);
        let mut visibility = ModelVisibility::new();
        visibility.toggle("model-a", ["model-a"]);
        let projection = project(&view, &visibility);
        assert!(projection
            .series
            .iter()
            .all(|s| s.role == SeriesRole::ForecastDate));
    }
}
