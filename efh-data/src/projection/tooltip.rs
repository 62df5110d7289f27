//! Tooltip content for hover groups of chart samples.

use super::{CONFIDENCE_AREA_SUFFIX, CONFIDENCE_LOWER_SUFFIX, CONFIDENCE_UPPER_SUFFIX, TRUTH_SERIES_NAME};
use chrono::NaiveDateTime;
use efh_core::target::Target;
use efh_utils::dates::format_date;
use efh_utils::numbers::format_int;
use serde::Serialize;
use std::fmt;

/// One series value at the hovered x position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipSample {
    pub series_id: String,
    pub series_name: String,
    pub axis_value: NaiveDateTime,
    pub value: f64,
    pub band: Option<(f64, f64)>,
    /// Colour of the series marker.
    pub marker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipLine {
    pub marker: String,
    pub label: String,
    pub value: f64,
    /// Lower and upper bound, shown only for a non-empty band.
    pub range: Option<(f64, f64)>,
}

impl TooltipLine {
    fn to_html(&self) -> String {
        let mut html = format!(
            "<span style=\"display:inline-block;margin-right:4px;border-radius:10px;width:10px;height:10px;background-color:{};\"></span>&nbsp;{}:&nbsp;{}",
            self.marker,
            self.label,
            format_int(self.value)
        );
        if let Some((lower, upper)) = self.range {
            html.push_str(&format!(
                "&nbsp;({}&nbsp;-&nbsp;{})",
                format_int(lower),
                format_int(upper)
            ));
        }
        html
    }
}

impl fmt::Display for TooltipLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, format_int(self.value))?;
        if let Some((lower, upper)) = self.range {
            write!(f, " ({} - {})", format_int(lower), format_int(upper))?;
        }
        Ok(())
    }
}

/// Header, optional truth line, then one line per model by descending value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipContent {
    pub header: String,
    pub truth: Option<TooltipLine>,
    pub lines: Vec<TooltipLine>,
}

impl TooltipContent {
    pub fn to_html(&self) -> String {
        let mut rows = vec![self.header.clone()];
        rows.extend(self.truth.iter().map(TooltipLine::to_html));
        rows.extend(self.lines.iter().map(TooltipLine::to_html));
        rows.join("<br/>")
    }
}

impl fmt::Display for TooltipContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        for line in self.truth.iter().chain(self.lines.iter()) {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

fn header(samples: &[TooltipSample]) -> Option<String> {
    samples.first().map(|s| format_date(&s.axis_value.date()))
}

fn truth_line(sample: &TooltipSample, target: Target) -> TooltipLine {
    TooltipLine {
        marker: sample.marker.clone(),
        label: target.label().to_string(),
        value: sample.value,
        range: None,
    }
}

fn sort_descending(lines: &mut [TooltipLine]) {
    lines.sort_by(|a, b| b.value.total_cmp(&a.value));
}

/// By-date tooltip.
///
/// Line, lower and upper samples of a model are merged by series name. The
/// upper sample holds the stacked difference, so the displayed upper bound
/// is `lower + upper`.
pub fn by_date_tooltip(samples: &[TooltipSample], target: Target) -> Option<TooltipContent> {
    #[derive(Default)]
    struct ModelValues {
        marker: String,
        value: f64,
        lower: f64,
        upper: f64,
    }

    let header = header(samples)?;
    let mut truth = None;
    let mut models: Vec<(&str, ModelValues)> = Vec::new();

    for sample in samples {
        if sample.series_name == TRUTH_SERIES_NAME {
            truth = Some(truth_line(sample, target));
            continue;
        }
        let index = match models.iter().position(|(name, _)| *name == sample.series_name) {
            Some(index) => index,
            None => {
                models.push((
                    sample.series_name.as_str(),
                    ModelValues {
                        marker: sample.marker.clone(),
                        ..ModelValues::default()
                    },
                ));
                models.len() - 1
            }
        };
        let values = &mut models[index].1;
        if sample.series_id.ends_with(CONFIDENCE_LOWER_SUFFIX) {
            values.lower = sample.value;
        } else if sample.series_id.ends_with(CONFIDENCE_UPPER_SUFFIX) {
            values.upper = sample.value;
        } else {
            values.value = sample.value;
        }
    }

    let mut lines: Vec<TooltipLine> = models
        .into_iter()
        .map(|(name, values)| {
            let upper = values.lower + values.upper;
            TooltipLine {
                marker: values.marker,
                label: name.to_string(),
                value: values.value,
                range: (values.lower != upper).then_some((values.lower, upper)),
            }
        })
        .collect();
    sort_descending(&mut lines);

    Some(TooltipContent {
        header,
        truth,
        lines,
    })
}

/// By-horizon tooltip. Nothing is shown while only confidence-area samples
/// are hovered.
pub fn by_horizon_tooltip(samples: &[TooltipSample], target: Target) -> Option<TooltipContent> {
    if samples
        .iter()
        .all(|s| s.series_id.ends_with(CONFIDENCE_AREA_SUFFIX))
    {
        return None;
    }
    let header = header(samples)?;
    let mut truth = None;
    let mut lines = Vec::new();

    for sample in samples {
        if sample.series_name == TRUTH_SERIES_NAME {
            truth = Some(truth_line(sample, target));
        } else if !sample.series_id.ends_with(CONFIDENCE_AREA_SUFFIX) {
            lines.push(TooltipLine {
                marker: sample.marker.clone(),
                label: sample.series_name.clone(),
                value: sample.value,
                range: sample.band,
            });
        }
    }
    sort_descending(&mut lines);

    Some(TooltipContent {
        header,
        truth,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(series_id: &str, series_name: &str, value: f64) -> TooltipSample {
        TooltipSample {
            series_id: series_id.to_string(),
            series_name: series_name.to_string(),
            axis_value: NaiveDate::from_ymd_opt(2023, 5, 13)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            value,
            band: None,
            marker: "#333".to_string(),
        }
    }

    #[test]
    fn test_by_date_orders_models_by_value() {
        let samples = vec![
            sample("cases-DE-a", "a", 100.0),
            sample("cases-DE-b", "b", 2500.0),
            sample("cases-DE-b-confidence-lower", "b", 2000.0),
            sample("cases-DE-b-confidence-upper", "b", 1000.0),
            sample("cases-DE-truth-data", "truth-data", 1800.0),
        ];
        let content = by_date_tooltip(&samples, Target::Cases).unwrap();
        assert_eq!(content.header, "2023-05-13");
        assert_eq!(content.lines[0].label, "b");
        assert_eq!(content.lines[0].range, Some((2000.0, 3000.0)));
        // zero-width band hides the range
        assert_eq!(content.lines[1].range, None);
        assert_eq!(
            content.to_string(),
            "2023-05-13\nCases: 1,800\nb: 2,500 (2,000 - 3,000)\na: 100"
        );
        assert_eq!(content.to_html().matches("<br/>").count(), 3);
    }

    #[test]
    fn test_empty_hover_group() {
        assert!(by_date_tooltip(&[], Target::Cases).is_none());
        assert!(by_horizon_tooltip(&[], Target::Death).is_none());
    }

    #[test]
    fn test_by_horizon_truth_first() {
        let mut with_band = sample("death-DE-a", "a", 50.0);
        with_band.band = Some((40.0, 60.0));
        let samples = vec![
            with_band,
            sample("death-DE-a-ci", "a", 40.0),
            sample("death-DE-truth-data", "truth-data", 45.0),
        ];
        let content = by_horizon_tooltip(&samples, Target::Death).unwrap();
        assert_eq!(content.lines.len(), 1);
        assert_eq!(content.truth.unwrap().label, "Deaths");
        assert!(content.lines[0].to_html().contains("&nbsp;(40&nbsp;-&nbsp;60)"));
    }
}
