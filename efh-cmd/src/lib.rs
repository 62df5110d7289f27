//! Command implementations for the EFH CLI.
//!
//! Every subcommand loads the sources once, drives a dashboard through
//! its commands and prints what the chart would show.

use chrono::NaiveDate;
use clap::Subcommand;

pub mod config;
pub mod play;
pub mod render;
pub mod source;

use config::{parse_date_arg, PlayArgs, SourceConfig, ViewArgs};

#[derive(Subcommand)]
pub enum Command {
    /// Print the chart series for a view
    Render {
        #[command(flatten)]
        sources: SourceConfig,

        #[command(flatten)]
        view: ViewArgs,

        /// Also print the tooltip at this date
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date_arg)]
        tooltip_at: Option<NaiveDate>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the available forecast dates for a location and target
    Dates {
        #[command(flatten)]
        sources: SourceConfig,

        #[command(flatten)]
        view: ViewArgs,

        #[arg(long)]
        json: bool,
    },

    /// List the models of a view with their colours and visibility
    Models {
        #[command(flatten)]
        sources: SourceConfig,

        #[command(flatten)]
        view: ViewArgs,

        #[arg(long)]
        json: bool,
    },

    /// Latest value and incidence per 100k for every location
    Map {
        #[command(flatten)]
        sources: SourceConfig,

        #[command(flatten)]
        view: ViewArgs,

        #[arg(long)]
        json: bool,
    },

    /// Play through the forecast dates, oldest last
    Play {
        #[command(flatten)]
        sources: SourceConfig,

        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        play: PlayArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Render {
            sources,
            view,
            tooltip_at,
            json,
        } => render::run_render(&sources, &view, tooltip_at, json).await,
        Command::Dates { sources, view, json } => render::run_dates(&sources, &view, json).await,
        Command::Models { sources, view, json } => render::run_models(&sources, &view, json).await,
        Command::Map { sources, view, json } => render::run_map(&sources, &view, json).await,
        Command::Play {
            sources,
            view,
            play,
        } => play::run_play(&sources, &view, &play).await,
    }
}
