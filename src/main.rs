use clap::Parser;
use nefrobd_client::{app, cli::Cli, ui::TerminalSurface};
use std::{process::ExitCode, sync::Arc};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match app::run(cli, Arc::new(TerminalSurface)).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            error!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
