//! Forecast date playback driven by a tokio interval.

use crate::config::{PlayArgs, SourceConfig, ViewArgs};
use crate::render::prepare_dashboard;
use crate::source::load_sources;
use efh_state::playback::PlaybackState;
use efh_state::{Command, Dashboard, DashboardConfig};
use efh_utils::dates::format_date;
use log::{info, warn};
use std::time::Instant;

/// Play through the forecast dates from the shown one to the oldest,
/// printing each published view. Playback restores the starting date
/// when it runs out of dates.
pub async fn run_play(sources: &SourceConfig, view: &ViewArgs, play: &PlayArgs) -> anyhow::Result<()> {
    let loaded = load_sources(sources).await?;
    let config = DashboardConfig {
        playback_interval: play.interval(),
        ..view.dashboard_config()
    };
    let tick = config.debounce;
    let mut dashboard = prepare_dashboard(loaded.dataset, view, config)?;

    dashboard.dispatch(Command::TogglePlayback, Instant::now())?;
    if dashboard.settings_state().playback() == PlaybackState::Idle {
        warn!("[EFH] play: nothing to play, playback needs by-date mode and an older forecast date");
        return Ok(());
    }
    info!("[EFH] play: started, {} dates available", dashboard.available_dates().len());
    print_frame(&dashboard);

    let mut ticker = tokio::time::interval(tick);
    loop {
        ticker.tick().await;
        if dashboard.poll(Instant::now()) {
            print_frame(&dashboard);
        }
        let idle = dashboard.settings_state().playback() == PlaybackState::Idle;
        if idle && dashboard.next_deadline().is_none() {
            break;
        }
    }
    info!("[EFH] play: finished");
    Ok(())
}

fn print_frame(dashboard: &Dashboard) {
    let Some(view) = dashboard.view() else {
        return;
    };
    let date = view
        .display_settings
        .display_mode
        .forecast_date()
        .map(|d| format_date(&d))
        .unwrap_or_default();
    let records: usize = view.forecasts.iter().map(|m| m.records.len()).sum();
    println!(
        "{} {} models, {} records",
        date,
        view.forecasts.len(),
        records
    );
}
