mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use log::{error, info};

use unifi_collector::{logging, AppConfig, CollectionLoop};

/// Exit code used when configuration, login, store ping or device listing fails
const BOOTSTRAP_FAILURE_EXIT_CODE: i32 = 1;

/// Exit code used when the process is stopped with Ctrl-C
const SIGINT_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        // Bootstrap failures are fatal
        error!("Fatal: {err:#}");
        logging::flush();
        std::process::exit(BOOTSTRAP_FAILURE_EXIT_CODE);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!(
        "Loading configuration from {} (environment overrides: {}__*)",
        cli.config.display(),
        Cli::env_prefix()
    );
    let config = AppConfig::load(&cli.config).context("Config file error")?;

    let mut collection_loop = CollectionLoop::connect(&config).await?;

    tokio::select! {
        never = collection_loop.run() => match never {},
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!(
                "Shutdown requested after {} cycles - exiting",
                collection_loop.cycle_count()
            );
            logging::flush();
            std::process::exit(SIGINT_EXIT_CODE);
        }
    }
}
