//! By-horizon projection: one horizon, every reference date.
//!
//! Each reference date contributes a short segment from its observed value
//! to its forecast at the chosen horizon. Segments are kept apart by
//! shifting their inner ends one minute and inserting a gap point, so the
//! line breaks between unrelated reference dates.

use super::{
    AreaCorner, AxisPosition, ChartSeries, MarkArea, SeriesPoint, SeriesRole, BAND_OPACITY,
    CONFIDENCE_AREA_SUFFIX,
};
use crate::view::ForecastModelSeries;
use chrono::{NaiveDate, TimeDelta};
use efh_core::filter::DataFilter;
use efh_core::forecast::{QuantileBand, QuantileSide, RecordKind};
use efh_core::settings::ByHorizonMode;
use efh_utils::dates::start_of_day;

/// Half-width of a confidence area around its target end date.
const AREA_HALF_WIDTH_DAYS: i64 = 3;

/// Quantile bounds found for one target end date.
#[derive(Debug, Clone, Copy, Default)]
struct AreaBounds {
    lower: Option<f64>,
    upper: Option<f64>,
}

impl AreaBounds {
    fn band(&self) -> Option<(f64, f64)> {
        Some((self.lower?, self.upper?))
    }

    fn lower_corner(&self, end_date: NaiveDate) -> Option<AreaCorner> {
        self.lower.map(|y| AreaCorner {
            x: AxisPosition::At(start_of_day(end_date - TimeDelta::days(AREA_HALF_WIDTH_DAYS))),
            y: Some(y),
        })
    }

    fn upper_corner(&self, end_date: NaiveDate) -> Option<AreaCorner> {
        self.upper.map(|y| AreaCorner {
            x: AxisPosition::At(start_of_day(end_date + TimeDelta::days(AREA_HALF_WIDTH_DAYS))),
            y: Some(y),
        })
    }
}

/// Records of one reference date at the selected horizon.
#[derive(Debug, Default)]
struct ReferenceGroup {
    reference_date: NaiveDate,
    line: Vec<(NaiveDate, f64)>,
    areas: Vec<(NaiveDate, AreaBounds)>,
}

impl ReferenceGroup {
    fn area_mut(&mut self, end_date: NaiveDate) -> &mut AreaBounds {
        let index = match self.areas.iter().position(|(d, _)| *d == end_date) {
            Some(index) => index,
            None => {
                self.areas.push((end_date, AreaBounds::default()));
                self.areas.len() - 1
            }
        };
        &mut self.areas[index].1
    }

    fn band_at(&self, end_date: NaiveDate) -> Option<(f64, f64)> {
        self.areas
            .iter()
            .find(|(d, _)| *d == end_date)
            .and_then(|(_, bounds)| bounds.band())
    }

    /// Earliest and latest line point, if the group can form a segment.
    fn segment(&self) -> Option<(SeriesPoint, SeriesPoint)> {
        if self.line.len() < 2 {
            return None;
        }
        let first = self.line.iter().min_by_key(|(d, _)| *d)?;
        let last = self.line.iter().max_by_key(|(d, _)| *d)?;
        let point = |(date, value): &(NaiveDate, f64)| SeriesPoint {
            x: start_of_day(*date),
            y: Some(*value),
            band: self.band_at(*date),
        };
        Some((point(first), point(last)))
    }
}

/// Position of a segment in the stitched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentPosition {
    First,
    Interior,
    Last,
}

impl SegmentPosition {
    fn of(index: usize, count: usize) -> Self {
        if index == 0 {
            SegmentPosition::First
        } else if index + 1 == count {
            SegmentPosition::Last
        } else {
            SegmentPosition::Interior
        }
    }
}

/// Join segments into one line.
///
/// The first segment keeps its start, the last keeps its end; every other
/// end is shifted one minute inwards. Every segment but the last is
/// followed by a gap at its unshifted end.
fn stitch(segments: &[(SeriesPoint, SeriesPoint)]) -> Vec<SeriesPoint> {
    let minute = TimeDelta::minutes(1);
    let mut points = Vec::with_capacity(segments.len() * 3);
    for (index, (start, end)) in segments.iter().enumerate() {
        let shifted_start = SeriesPoint {
            x: start.x + minute,
            ..*start
        };
        let shifted_end = SeriesPoint {
            x: end.x - minute,
            ..*end
        };
        match SegmentPosition::of(index, segments.len()) {
            SegmentPosition::First => {
                points.extend([*start, shifted_end, SeriesPoint::gap(end.x)]);
            }
            SegmentPosition::Interior => {
                points.extend([shifted_start, shifted_end, SeriesPoint::gap(end.x)]);
            }
            SegmentPosition::Last => {
                points.extend([shifted_start, *end]);
            }
        }
    }
    points
}

fn group_by_reference_date(
    model: &ForecastModelSeries,
    mode: &ByHorizonMode,
    band: Option<QuantileBand>,
) -> Vec<ReferenceGroup> {
    let horizon = mode.weeks_ahead.as_horizon();
    let mut groups: Vec<ReferenceGroup> = Vec::new();

    for record in &model.records {
        // observed values anchor every segment regardless of horizon
        let is_line = match record.kind {
            RecordKind::Observed => true,
            RecordKind::Point => record.horizon_weeks == horizon,
            RecordKind::Quantile(_) => false,
        };
        let quantile = record
            .kind
            .quantile()
            .filter(|q| record.horizon_weeks == horizon && Some(q.band) == band);
        if !is_line && quantile.is_none() {
            continue;
        }

        let index = match groups.iter().position(|g| g.reference_date == record.reference_date) {
            Some(index) => index,
            None => {
                groups.push(ReferenceGroup {
                    reference_date: record.reference_date,
                    ..ReferenceGroup::default()
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];

        if is_line {
            group.line.push((record.target_end_date, record.value));
        } else if let Some(quantile) = quantile {
            let area = group.area_mut(record.target_end_date);
            match quantile.side {
                QuantileSide::Lower => area.lower = Some(record.value),
                QuantileSide::Upper => area.upper = Some(record.value),
            }
        }
    }
    groups
}

pub(crate) fn project(
    filter: &DataFilter,
    mode: &ByHorizonMode,
    band: Option<QuantileBand>,
    models: &[&ForecastModelSeries],
) -> Vec<ChartSeries> {
    let mut series = Vec::with_capacity(models.len() * 2);
    for model in models {
        let groups = group_by_reference_date(model, mode, band);

        let segments: Vec<(SeriesPoint, SeriesPoint)> =
            groups.iter().filter_map(ReferenceGroup::segment).collect();
        if segments.len() < groups.len() {
            log::debug!(
                "[EFH] projection: {} has {} reference dates without a full segment",
                model.model,
                groups.len() - segments.len()
            );
        }

        let mut mark_areas = Vec::new();
        let mut area_points = Vec::new();
        for group in &groups {
            for (end_date, bounds) in &group.areas {
                let start = bounds.lower_corner(*end_date);
                let end = bounds.upper_corner(*end_date);
                for corner in [start, end].into_iter().flatten() {
                    if let (AxisPosition::At(x), Some(y)) = (corner.x, corner.y) {
                        area_points.push(SeriesPoint::new(x, y));
                    }
                }
                mark_areas.push(MarkArea { start, end });
            }
        }

        let id = format!("{}-{}", filter.series_prefix(), model.model);

        let mut line = ChartSeries::new(id.clone(), &model.model, &model.color, SeriesRole::Forecast);
        line.points = stitch(&segments);
        line.mark_areas = mark_areas;
        line.fill_opacity = Some(BAND_OPACITY);

        let mut areas = ChartSeries::new(
            format!("{}{}", id, CONFIDENCE_AREA_SUFFIX),
            &model.model,
            &model.color,
            SeriesRole::ConfidenceArea,
        );
        areas.hidden = true;
        areas.points = area_points;

        series.push(line);
        series.push(areas);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::project as project_view;
    use crate::view::tests::{date, quantile, record};
    use crate::view::ChartDataView;
    use crate::visibility::ModelVisibility;
    use efh_core::forecast::ForecastRecord;
    use efh_core::settings::{DisplayMode, DisplaySettings, Weeks};
    use efh_core::target::Target;

    fn horizon_view(records: Vec<ForecastRecord>) -> ChartDataView {
        let mut view = ChartDataView::empty(
            DataFilter::new(Some("DE".to_string()), Target::Cases),
            DisplaySettings {
                confidence_band: Some(QuantileBand::Q95),
                display_mode: DisplayMode::ByHorizon(ByHorizonMode {
                    weeks_ahead: Weeks::TWO,
                }),
            },
        );
        view.forecasts.push(ForecastModelSeries {
            model: "model-a".to_string(),
            color: "rgb(101,179,46)".to_string(),
            records,
        });
        view
    }

    fn reference_week(reference: NaiveDate, value: f64) -> Vec<ForecastRecord> {
        vec![
            record("model-a", RecordKind::Observed, reference, 0, value),
            record("model-a", RecordKind::Point, reference, 1, value + 5.0),
            record("model-a", RecordKind::Point, reference, 2, value + 10.0),
            record("model-a", quantile(QuantileBand::Q95, QuantileSide::Lower), reference, 2, value + 2.0),
            record("model-a", quantile(QuantileBand::Q95, QuantileSide::Upper), reference, 2, value + 20.0),
            record("model-a", quantile(QuantileBand::Q50, QuantileSide::Upper), reference, 2, value + 12.0),
        ]
    }

    #[test]
    fn test_segment_bracketing_by_position() {
        let mut records = reference_week(date(2023, 4, 29), 100.0);
        records.extend(reference_week(date(2023, 5, 6), 200.0));
        records.extend(reference_week(date(2023, 5, 13), 300.0));
        let projection = project_view(&horizon_view(records), &ModelVisibility::new());

        let line = projection.series_by_id("cases-DE-model-a").unwrap();
        // first: 3, interior: 3, last: 2
        assert_eq!(line.points.len(), 8);
        let gaps: Vec<usize> = line
            .points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_gap())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(gaps, vec![2, 5]);

        let minute = TimeDelta::minutes(1);
        let first_start = start_of_day(date(2023, 4, 29));
        let first_end = start_of_day(date(2023, 5, 13));
        // the first segment keeps its natural start
        assert_eq!(line.points[0].x, first_start);
        assert_eq!(line.points[1].x, first_end - minute);
        assert_eq!(line.points[2].x, first_end);
        // interior start is shifted
        assert_eq!(line.points[3].x, start_of_day(date(2023, 5, 6)) + minute);
        // the last segment keeps its natural end
        assert_eq!(line.points[6].x, start_of_day(date(2023, 5, 13)) + minute);
        assert_eq!(line.points[7].x, start_of_day(date(2023, 5, 27)));
        assert_eq!(line.points[7].y, Some(310.0));
    }

    #[test]
    fn test_areas_offset_around_end_date() {
        let projection = project_view(
            &horizon_view(reference_week(date(2023, 5, 6), 100.0)),
            &ModelVisibility::new(),
        );
        let line = projection.series_by_id("cases-DE-model-a").unwrap();
        assert_eq!(line.mark_areas.len(), 1);
        let area = line.mark_areas[0];
        assert_eq!(
            area.start.unwrap().x,
            AxisPosition::At(start_of_day(date(2023, 5, 17)))
        );
        assert_eq!(area.end.unwrap().y, Some(120.0));
        // single group keeps the first-segment shape
        assert_eq!(line.points.len(), 3);
        // band attached to the forecast point
        assert_eq!(line.points[1].band, Some((102.0, 120.0)));

        let ci = projection.series_by_id("cases-DE-model-a-ci").unwrap();
        assert!(ci.hidden);
        assert_eq!(ci.points.len(), 2);
    }

    #[test]
    fn test_missing_upper_omits_bound() {
        let reference = date(2023, 5, 6);
        let records = vec![
            record("model-a", RecordKind::Observed, reference, 0, 1.0),
            record("model-a", RecordKind::Point, reference, 2, 2.0),
            record("model-a", quantile(QuantileBand::Q95, QuantileSide::Lower), reference, 2, 1.5),
        ];
        let projection = project_view(&horizon_view(records), &ModelVisibility::new());
        let line = projection.series_by_id("cases-DE-model-a").unwrap();
        assert!(line.mark_areas[0].end.is_none());
        assert!(line.points.iter().all(|p| p.band.is_none()));
    }

    #[test]
    fn test_single_point_group_is_not_stitched() {
        let mut records = reference_week(date(2023, 4, 29), 100.0);
        // no observed value for this reference date
        records.push(record("model-a", RecordKind::Point, date(2023, 5, 6), 2, 50.0));
        records.push(record(
            "model-a",
            quantile(QuantileBand::Q95, QuantileSide::Lower),
            date(2023, 5, 6),
            2,
            40.0,
        ));
        let projection = project_view(&horizon_view(records), &ModelVisibility::new());
        let line = projection.series_by_id("cases-DE-model-a").unwrap();
        assert_eq!(line.points.len(), 3);
        assert_eq!(line.mark_areas.len(), 2);
    }

    #[test]
    fn test_tooltip_suppressed_for_area_only_samples() {
        let projection = project_view(
            &horizon_view(reference_week(date(2023, 5, 6), 100.0)),
            &ModelVisibility::new(),
        );
        let samples = projection.samples_at(start_of_day(date(2023, 5, 17)));
        assert_eq!(samples.len(), 1);
        assert!(projection.tooltip(&samples).is_none());

        let samples = projection.samples_at(start_of_day(date(2023, 5, 20)) - TimeDelta::minutes(1));
        let content = projection.tooltip(&samples).unwrap();
        assert_eq!(content.lines[0].value, 110.0);
        assert_eq!(content.lines[0].range, Some((102.0, 120.0)));
    }
}
