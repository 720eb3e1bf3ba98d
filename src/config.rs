//! # Configuration Module
//!
//! Loads and validates the collector configuration.
//!
//! ## Sources
//!
//! 1. A configuration file; the format follows the extension, so the classic
//!    `config.ini` with `[Unifi]` and `[Influx]` sections works as-is
//! 2. Environment overrides of the form `UNIFI_COLLECTOR__UNIFI__PASSWORD`
//!
//! ## Example
//!
//! ```ini
//! [Unifi]
//! url = unifi.local
//! username = admin
//! password = secret
//! site_id = default
//! version = v5
//! ssl = True
//! sleep = 30
//!
//! [Influx]
//! url = localhost
//! port = 8086
//! username = collector
//! password = secret
//! database = unifi
//! ```
//!
//! Values are typed: `ssl = maybe` or `sleep = soon` fail at load time with a
//! message naming the key instead of quietly falling back to a default.

use config::Source;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::collectors::unifi::controller_base_url;
use crate::storage::influx::store_base_url;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "UNIFI_COLLECTOR";

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to load configuration from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("Invalid configuration value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

/// Controller API flavour, which decides login and API paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ControllerVersion {
    V4,
    #[default]
    V5,
    /// UniFi OS consoles (UDM, Cloud Key Gen2+), API proxied under `/proxy/network`
    UnifiOs,
}

impl ControllerVersion {
    pub fn login_path(self) -> &'static str {
        match self {
            ControllerVersion::V4 | ControllerVersion::V5 => "/api/login",
            ControllerVersion::UnifiOs => "/api/auth/login",
        }
    }

    pub fn api_prefix(self) -> &'static str {
        match self {
            ControllerVersion::V4 | ControllerVersion::V5 => "",
            ControllerVersion::UnifiOs => "/proxy/network",
        }
    }
}

impl FromStr for ControllerVersion {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "v4" => Ok(ControllerVersion::V4),
            "v5" => Ok(ControllerVersion::V5),
            "unifios" | "udmp-unifios" => Ok(ControllerVersion::UnifiOs),
            other => Err(format!(
                "unknown controller version '{other}' (expected v4, v5, unifiOS or UDMP-unifiOS)"
            )),
        }
    }
}

impl TryFrom<String> for ControllerVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// `[Unifi]` section: where and how to reach the controller, and the poll cadence
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_site_id")]
    pub site_id: String,
    #[serde(default)]
    pub version: ControllerVersion,
    /// Verify the controller's TLS certificate
    pub ssl: bool,
    /// Poll interval in seconds
    pub sleep: u64,
    /// Port used when `url` is a bare host
    #[serde(default = "default_controller_port")]
    pub port: u16,
}

impl ControllerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sleep)
    }
}

/// `[Influx]` section: the time-series store receiving measurements
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    #[serde(default = "default_store_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
    /// Measurement name shared by the per-port rx/tx points
    #[serde(default = "default_port_measurement")]
    pub measurement: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "unifi", alias = "controller")]
    pub controller: ControllerConfig,
    #[serde(rename = "influx", alias = "store")]
    pub store: StoreConfig,
}

/// Lowercases table keys at every depth so file keys line up with environment keys
fn lowercase_keys(value: config::Value) -> config::Value {
    match value.kind {
        config::ValueKind::Table(table) => {
            let folded: config::Map<String, config::Value> = table
                .into_iter()
                .map(|(key, nested)| (key.to_lowercase(), lowercase_keys(nested)))
                .collect();
            config::Value::new(None, config::ValueKind::Table(folded))
        }
        kind => config::Value::new(None, kind),
    }
}

fn default_site_id() -> String {
    "default".to_string()
}

fn default_controller_port() -> u16 {
    8443
}

fn default_store_port() -> u16 {
    8086
}

fn default_port_measurement() -> String {
    "unifi".to_string()
}

impl AppConfig {
    /// Loads the file at `path`, applies environment overrides and validates
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`AppConfig::load`], reading overrides from `env` instead of the
    /// process environment when it is given
    pub fn load_with_env(
        path: &Path,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }

        let load_error = |source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        };

        // The file keeps its section case (`[Unifi]`) while environment keys
        // arrive lowercased, so file keys are folded before the two are merged
        let file_values = config::File::from(path).collect().map_err(load_error)?;
        let mut builder = config::Config::builder();
        for (section, value) in file_values {
            builder = builder
                .set_default(section.to_lowercase(), lowercase_keys(value))
                .map_err(load_error)?;
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(load_error)?;

        let app_config: AppConfig = settings.try_deserialize().map_err(load_error)?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Checks values serde cannot: non-empty strings, a usable interval, parseable URLs
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("unifi.url", &self.controller.url),
            ("unifi.username", &self.controller.username),
            ("unifi.password", &self.controller.password),
            ("unifi.site_id", &self.controller.site_id),
            ("influx.url", &self.store.url),
            ("influx.database", &self.store.database),
            ("influx.measurement", &self.store.measurement),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key,
                    message: "must not be empty".to_string(),
                });
            }
        }

        if self.controller.sleep == 0 {
            return Err(ConfigError::Invalid {
                key: "unifi.sleep",
                message: "poll interval must be at least 1 second".to_string(),
            });
        }

        controller_base_url(&self.controller.url, self.controller.port).map_err(|error| {
            ConfigError::Invalid {
                key: "unifi.url",
                message: error.to_string(),
            }
        })?;

        store_base_url(&self.store.url, self.store.port).map_err(|error| ConfigError::Invalid {
            key: "influx.url",
            message: error.to_string(),
        })?;

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        self.controller.interval()
    }
}
