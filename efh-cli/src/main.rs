//! EFH CLI - Command line tool for forecast hub chart data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "efh-cli",
    version,
    about = "Forecast hub forecast and truth data toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: efh_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("[EFH] cli: starting");
    efh_cmd::run(cli.command).await
}
