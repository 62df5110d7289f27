//! One-shot commands: load the sources, apply the requested view and print.

use crate::config::{SourceConfig, ViewArgs};
use crate::source::{load_sources, LoadedSources};
use chrono::NaiveDate;
use efh_core::dataset::Dataset;
use efh_data::choropleth::location_values;
use efh_core::model_settings::ModelMetadata;
use efh_state::{Dashboard, DashboardConfig, StepDirection};
use efh_utils::dates::{format_date, start_of_day};
use efh_utils::numbers::{format_decimal, format_int};
use log::info;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;

/// A dashboard with `dataset` loaded and the view arguments applied.
pub fn prepare_dashboard(
    dataset: Dataset,
    view: &ViewArgs,
    config: DashboardConfig,
) -> anyhow::Result<Dashboard> {
    let mut dashboard = Dashboard::new(config, chrono::Local::now().date_naive());
    let now = Instant::now();
    dashboard.load_dataset(dataset, now);
    for command in view.commands() {
        dashboard.dispatch(command, now)?;
    }
    dashboard.flush();
    Ok(dashboard)
}

async fn load(
    sources: &SourceConfig,
    view: &ViewArgs,
) -> anyhow::Result<(Dashboard, HashMap<String, ModelMetadata>)> {
    let LoadedSources { dataset, metadata } = load_sources(sources).await?;
    let dashboard = prepare_dashboard(dataset, view, view.dashboard_config())?;
    Ok((dashboard, metadata))
}

/// Print the chart projection, and optionally the tooltip at one date.
pub async fn run_render(
    sources: &SourceConfig,
    view: &ViewArgs,
    tooltip_at: Option<NaiveDate>,
    as_json: bool,
) -> anyhow::Result<()> {
    let (dashboard, _) = load(sources, view).await?;
    let Some(projection) = dashboard.projection() else {
        anyhow::bail!("No projection was computed");
    };
    let tooltip = tooltip_at.and_then(|date| projection.tooltip(&projection.samples_at(start_of_day(date))));

    if as_json {
        let output = json!({ "projection": projection, "tooltip": tooltip });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let filter = dashboard.filter();
    println!(
        "{} in {}, {}",
        projection.y_axis_label,
        filter.location.as_deref().unwrap_or("-"),
        projection.mode
    );
    if let Some(date) = dashboard.display_settings().display_mode.forecast_date() {
        println!("forecast date: {}", format_date(&date));
    }
    if let Some(max) = projection.x_axis_max {
        println!("x axis max: {}", format_date(&max));
    }
    for series in &projection.series {
        println!(
            "  {} [{:?}] {} points{}",
            series.id,
            series.role,
            series.points.len(),
            if series.hidden { ", hidden" } else { "" }
        );
    }
    match tooltip {
        Some(tooltip) => println!("\n{}", tooltip),
        None if tooltip_at.is_some() => println!("\nno tooltip at that date"),
        None => {}
    }
    Ok(())
}

/// Print the available forecast dates for the filter, marking the shown one.
pub async fn run_dates(sources: &SourceConfig, view: &ViewArgs, as_json: bool) -> anyhow::Result<()> {
    let (dashboard, _) = load(sources, view).await?;
    let available = dashboard.available_dates();
    let shown = dashboard.display_settings().display_mode.forecast_date();
    let settings = dashboard.settings_state();

    if as_json {
        let output = json!({
            "availableForecastDates": available,
            "forecastDate": shown,
            "canStepOlder": settings.can_step(StepDirection::Older, &available),
            "canStepNewer": settings.can_step(StepDirection::Newer, &available),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    info!("[EFH] dates: {} available forecast dates", available.len());
    for date in &available {
        let marker = if Some(*date) == shown { "*" } else { " " };
        println!("{} {}", marker, format_date(date));
    }
    Ok(())
}

/// Print the models of the current view with colour, visibility and metadata.
pub async fn run_models(sources: &SourceConfig, view: &ViewArgs, as_json: bool) -> anyhow::Result<()> {
    let (dashboard, metadata) = load(sources, view).await?;
    let (Some(chart_view), Some(dataset)) = (dashboard.view(), dashboard.dataset()) else {
        anyhow::bail!("No view was computed");
    };
    let ensemble = &dataset.model_selection().ensemble_model_names;

    let models: Vec<_> = chart_view
        .forecasts
        .iter()
        .map(|series| {
            let metadata = metadata.get(&series.model);
            json!({
                "model": series.model,
                "color": series.color,
                "visible": dashboard.visibility().is_visible(&series.model),
                "ensemble": ensemble.contains(&series.model),
                "records": series.records.len(),
                "team": metadata.map(|m| m.team.as_str()),
                "description": metadata.map(|m| m.description_short.as_str()),
            })
        })
        .collect();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }
    for series in &chart_view.forecasts {
        let visible = if dashboard.visibility().is_visible(&series.model) { "x" } else { " " };
        let ensemble_marker = if ensemble.contains(&series.model) { " (ensemble)" } else { "" };
        println!(
            "[{}] {} {} {} records{}",
            visible,
            series.color,
            series.model,
            series.records.len(),
            ensemble_marker
        );
        if let Some(metadata) = metadata.get(&series.model) {
            println!("      {}: {}", metadata.team, metadata.description_short);
        }
    }
    Ok(())
}

/// Print the latest value and incidence per location for the target.
pub async fn run_map(sources: &SourceConfig, view: &ViewArgs, as_json: bool) -> anyhow::Result<()> {
    let (dashboard, _) = load(sources, view).await?;
    let Some(dataset) = dashboard.dataset() else {
        anyhow::bail!("No dataset was loaded");
    };
    let values = location_values(dataset, view.target);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }
    for value in &values {
        println!(
            "{} {:<24} {:>10} {:>12} {}",
            value.id,
            value.name,
            value.date.map(|d| format_date(&d)).unwrap_or_else(|| "-".to_string()),
            format_int(value.value),
            value
                .incidence
                .map(|i| format_decimal(i, 1))
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BandArg, ModeArg};
    use efh_core::forecast::parse_forecast_csv;
    use efh_core::location::LocationLookup;
    use efh_core::settings::{DisplayModeKind, Weeks};
    use efh_core::target::Target;
    use efh_core::truth::parse_truth_csv;

    const FORECASTS: &str = "\
scenario,model,location,forecast_date,timezero,target,target_end_date,type,quantile,value
forecast,model-a,DE,2023-05-15,2023-05-13,1 wk ahead inc case,2023-05-20,point,,1200
forecast,model-a,DE,2023-05-15,2023-05-13,2 wk ahead inc case,2023-05-27,point,,1300
forecast,model-a,DE,2023-05-08,2023-05-06,1 wk ahead inc case,2023-05-13,point,,1100
";

    const TRUTH: &str = "\
date,location,inc_case,inc_death
2023-05-06,DE,1000,10
2023-05-13,DE,1050,12
";

    fn dataset() -> Dataset {
        let locations = LocationLookup::parse_location_csv(
            "location,location_name,population\nDE,Germany,83166711\n",
        )
        .unwrap();
        Dataset::new(
            parse_forecast_csv(FORECASTS).unwrap(),
            parse_truth_csv(TRUTH).unwrap(),
        )
        .with_locations(locations)
    }

    fn view(mode: ModeArg) -> ViewArgs {
        ViewArgs {
            location: None,
            target: Target::Cases,
            mode,
            forecast_date: None,
            weeks: Some(Weeks::ONE),
            band: BandArg::Q50,
            models: None,
        }
    }

    #[test]
    fn test_prepare_dashboard_applies_view() {
        let args = view(ModeArg::ByDate);
        let dashboard = prepare_dashboard(dataset(), &args, args.dashboard_config()).unwrap();
        let chart_view = dashboard.view().unwrap();
        assert_eq!(chart_view.filter.location.as_deref(), Some("DE"));
        assert_eq!(
            chart_view.display_settings.display_mode.forecast_date(),
            NaiveDate::from_ymd_opt(2023, 5, 13)
        );
        // only the one week ahead record of the most recent date
        assert_eq!(chart_view.forecasts[0].records.len(), 1);
        assert!(dashboard.projection().unwrap().series_by_id("cases-DE-truth-data").is_some());
    }

    #[test]
    fn test_prepare_dashboard_by_horizon() {
        let args = view(ModeArg::ByHorizon);
        let dashboard = prepare_dashboard(dataset(), &args, args.dashboard_config()).unwrap();
        assert_eq!(dashboard.projection().unwrap().mode, DisplayModeKind::ByHorizon);
        assert_eq!(dashboard.view().unwrap().forecasts[0].records.len(), 2);
    }
}
