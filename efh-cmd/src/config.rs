//! Source locations and view options shared by all subcommands.

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use efh_core::forecast::QuantileBand;
use efh_core::settings::{DisplayModeKind, Weeks};
use efh_core::target::Target;
use efh_state::{Command, DashboardConfig};
use std::time::Duration;

const HUB_VIZ_URL: &str =
    "https://raw.githubusercontent.com/epiforecasts/covid19-forecast-hub-europe/main/viz";

/// Where the dashboard sources are read from. Each value is a local path or
/// an `http(s)` URL; gzip-compressed snapshots are accepted.
#[derive(Args, Debug, Clone)]
pub struct SourceConfig {
    /// Forecast records, CSV or JSON (chosen by file extension)
    #[arg(long, env = "EFH_FORECASTS", default_value_t = format!("{HUB_VIZ_URL}/forecasts_to_plot.csv"))]
    pub forecasts: String,

    /// Truth data CSV
    #[arg(long, env = "EFH_TRUTH", default_value_t = format!("{HUB_VIZ_URL}/truth_to_plot.csv"))]
    pub truth: String,

    /// Location lookup CSV
    #[arg(long, env = "EFH_LOCATIONS", default_value_t = format!("{HUB_VIZ_URL}/location_codes.csv"))]
    pub locations: String,

    /// Default and ensemble model selection JSON
    #[arg(long, env = "EFH_MODEL_SETTINGS", default_value_t = format!("{HUB_VIZ_URL}/settings_model_selection.json"))]
    pub model_settings: String,

    /// Optional model metadata JSON, keyed by model abbreviation
    #[arg(long, env = "EFH_METADATA")]
    pub metadata: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandArg {
    None,
    Q50,
    Q95,
}

impl From<BandArg> for Option<QuantileBand> {
    fn from(band: BandArg) -> Self {
        match band {
            BandArg::None => None,
            BandArg::Q50 => Some(QuantileBand::Q50),
            BandArg::Q95 => Some(QuantileBand::Q95),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    ByDate,
    ByHorizon,
}

impl From<ModeArg> for DisplayModeKind {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::ByDate => DisplayModeKind::ByDate,
            ModeArg::ByHorizon => DisplayModeKind::ByHorizon,
        }
    }
}

/// Filter and display settings applied after the sources are loaded.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Location id, e.g. DE; defaults to the first location by name
    #[arg(short, long)]
    pub location: Option<String>,

    /// cases or death
    #[arg(short, long, default_value = "cases", value_parser = parse_target)]
    pub target: Target,

    #[arg(short, long, value_enum, default_value_t = ModeArg::ByDate)]
    pub mode: ModeArg,

    /// Forecast date to show in by-date mode (snapped to an available date)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date_arg)]
    pub forecast_date: Option<NaiveDate>,

    /// Weeks shown (by date) or weeks ahead (by horizon), 1 to 4
    #[arg(short, long, value_parser = parse_weeks)]
    pub weeks: Option<Weeks>,

    #[arg(long, value_enum, default_value_t = BandArg::Q95)]
    pub band: BandArg,

    /// Visible models; all or the configured defaults when omitted
    #[arg(long, value_delimiter = ',')]
    pub models: Option<Vec<String>>,
}

impl ViewArgs {
    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            default_location: self.location.clone(),
            ..DashboardConfig::default()
        }
    }

    /// Commands that bring a freshly loaded dashboard into the requested view.
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = vec![
            Command::ChangeTarget(self.target),
            Command::ChangeConfidenceInterval(self.band.into()),
        ];
        if let Some(date) = self.forecast_date {
            commands.push(Command::ChangeForecastDate(date));
        }
        commands.push(Command::ChangeDisplayMode(self.mode.into()));
        if let Some(weeks) = self.weeks {
            commands.push(match self.mode {
                ModeArg::ByDate => Command::ChangeDateWeeksShown(weeks),
                ModeArg::ByHorizon => Command::ChangeHorizonWeeksAhead(weeks),
            });
        }
        if let Some(models) = &self.models {
            commands.push(Command::ChangeVisibleModels(models.clone()));
        }
        commands
    }
}

/// Playback tunables.
#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// Milliseconds between two playback steps
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
}

impl PlayArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn parse_target(s: &str) -> Result<Target, String> {
    s.parse::<Target>().map_err(|e| e.to_string())
}

pub(crate) fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    efh_utils::dates::parse_date(s).map_err(|e| e.to_string())
}

fn parse_weeks(s: &str) -> Result<Weeks, String> {
    let weeks = s.parse::<u8>().map_err(|e| e.to_string())?;
    Weeks::new(weeks).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(mode: ModeArg) -> ViewArgs {
        ViewArgs {
            location: Some("DE".to_string()),
            target: Target::Death,
            mode,
            forecast_date: None,
            weeks: Some(Weeks::THREE),
            band: BandArg::None,
            models: None,
        }
    }

    #[test]
    fn test_weeks_follow_the_mode() {
        let by_date = args(ModeArg::ByDate).commands();
        assert!(by_date.contains(&Command::ChangeDateWeeksShown(Weeks::THREE)));
        let by_horizon = args(ModeArg::ByHorizon).commands();
        assert!(by_horizon.contains(&Command::ChangeHorizonWeeksAhead(Weeks::THREE)));
        // the mode switch comes before the weeks change
        let mode_at = by_horizon
            .iter()
            .position(|c| matches!(c, Command::ChangeDisplayMode(_)))
            .unwrap();
        assert_eq!(
            by_horizon[mode_at + 1],
            Command::ChangeHorizonWeeksAhead(Weeks::THREE)
        );
    }

    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_weeks("4"), Ok(Weeks::FOUR));
        assert!(parse_weeks("5").is_err());
        assert_eq!(parse_target("death"), Ok(Target::Death));
        assert!(parse_target("hospital").is_err());
    }
}
