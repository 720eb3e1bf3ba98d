use clap::Parser;
use std::path::PathBuf;

use unifi_collector::config::{DEFAULT_CONFIG_FILE, ENV_PREFIX};

/// Command line of the collector daemon
/// There are no subcommands: the process starts, bootstraps and runs until stopped
#[derive(Parser, Debug)]
#[command(author = "Kaipo Chen")]
#[command(version)] // Automatically uses version from Cargo.toml
#[command(about = "Poll a UniFi controller for device statistics and publish them to InfluxDB")]
#[command(long_about = "Runs as a long-lived daemon: logs in to the UniFi controller, enumerates its devices once, \
then on every interval fetches each device's statistics, publishes the numeric counters and per-port \
rx/tx byte counters to InfluxDB, and sleeps for the rest of the interval.\n\n\
Configuration values can be overridden from the environment, e.g. UNIFI_COLLECTOR__UNIFI__PASSWORD.\n\n\
Examples:\n  \
unifi-collector                          # Use ./config.ini\n  \
unifi-collector --config /etc/unifi.ini  # Use a specific file\n  \
RUST_LOG=debug unifi-collector           # Verbose logging")]
pub struct Cli {
    /// Path to the configuration file (INI, TOML, YAML or JSON by extension)
    #[arg(
        short,
        long,
        env = "UNIFI_COLLECTOR_CONFIG",
        default_value = DEFAULT_CONFIG_FILE,
        help = "Configuration file path"
    )]
    pub config: PathBuf,
}

impl Cli {
    /// Prefix accepted for environment overrides, shown in startup logs
    pub fn env_prefix() -> &'static str {
        ENV_PREFIX
    }
}
