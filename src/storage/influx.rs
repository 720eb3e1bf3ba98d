//! InfluxDB 1.x HTTP writer
//!
//! Uses the `/ping` and `/write` endpoints. Each measurement is sent as its
//! own request so a rejected point never takes others down with it.

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Client, Url};
use std::time::Duration;

use super::errors::SinkError;
use super::line_protocol;
use super::sink::MeasurementWriter;
use crate::config::StoreConfig;
use crate::models::Measurement;

/// Per-request timeout applied by the HTTP client
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body kept in error messages
const MAX_ERROR_BODY: usize = 256;

/// Writes measurements to an InfluxDB 1.x database over HTTP
pub struct InfluxWriter {
    http: Client,
    base_url: Url,
    database: String,
    username: String,
    password: String,
}

impl std::fmt::Debug for InfluxWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxWriter")
            .field("base_url", &self.base_url.as_str())
            .field("database", &self.database)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl InfluxWriter {
    /// Builds a writer without contacting the store
    pub fn new(config: &StoreConfig) -> Result<Self, SinkError> {
        let base_url = store_base_url(&config.url, config.port)?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| SinkError::Unavailable {
                measurement: String::new(),
                reason: format!("failed to build HTTP client: {error}"),
            })?;

        Ok(Self {
            http,
            base_url,
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of the write endpoint for the configured database
    pub fn write_url(&self) -> Result<Url, SinkError> {
        let mut url = self
            .base_url
            .join("write")
            .map_err(|error| SinkError::Unavailable {
                measurement: String::new(),
                reason: format!("invalid write url: {error}"),
            })?;
        url.query_pairs_mut().append_pair("db", &self.database);
        Ok(url)
    }
}

#[async_trait]
impl MeasurementWriter for InfluxWriter {
    async fn ping(&self) -> Result<(), SinkError> {
        let url = self
            .base_url
            .join("ping")
            .map_err(|error| SinkError::Unavailable {
                measurement: String::new(),
                reason: format!("invalid ping url: {error}"),
            })?;

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|error| SinkError::Unavailable {
                measurement: String::new(),
                reason: format!("ping {url} failed: {error}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Unavailable {
                measurement: String::new(),
                reason: format!("ping {url} returned HTTP {status}"),
            });
        }

        debug!(
            "InfluxDB ping ok (status={}, version={})",
            status,
            response
                .headers()
                .get("x-influxdb-version")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("unknown")
        );
        Ok(())
    }

    async fn write(&self, measurement: &Measurement) -> Result<(), SinkError> {
        let line = line_protocol::encode(measurement)?;
        let url = self.write_url()?;
        trace!("Writing line to {}: {}", url, line);

        let mut request = self.http.post(url).body(line);
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let unavailable = |reason: String| SinkError::Unavailable {
            measurement: measurement.name.clone(),
            reason,
        };

        let response = request
            .send()
            .await
            .map_err(|error| unavailable(format!("request failed: {error}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(unavailable(format!("HTTP {status}: {}", body.trim())))
    }
}

/// Resolves the store base URL from the configured `url` and `port`
///
/// A bare host gets `http://` and the configured port; a full URL keeps its
/// scheme and path and only takes the configured port when it has none.
pub fn store_base_url(url: &str, port: u16) -> Result<Url, SinkError> {
    let url = url.trim();
    let candidate = if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    };

    let invalid = |reason: String| SinkError::Unavailable {
        measurement: String::new(),
        reason,
    };

    let mut parsed =
        Url::parse(&candidate).map_err(|error| invalid(format!("store url '{candidate}': {error}")))?;
    if parsed.host_str().is_none() {
        return Err(invalid(format!("store url '{candidate}' has no host")));
    }
    if parsed.port().is_none() {
        parsed
            .set_port(Some(port))
            .map_err(|_| invalid(format!("store url '{candidate}' cannot take a port")))?;
    }
    // Keep a trailing slash so `join` appends instead of replacing the last segment
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed)
}
