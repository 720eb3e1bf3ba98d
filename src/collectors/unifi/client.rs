//! UniFi controller HTTP client
//!
//! A thin wrapper around the controller's REST API: log in once, then fetch
//! the device list from `stat/device` on demand. Everything above this module
//! talks to the [`ControllerClient`] trait so tests can swap in a fake.

use async_trait::async_trait;
use log::{debug, info, trace, warn};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::errors::ControllerError;
use crate::config::{ControllerConfig, ControllerVersion};
use crate::models::{raw_stats_from_json, AccessPoint, RawStats};

/// Header the controller uses to hand out and check its CSRF token
const CSRF_HEADER: &str = "x-csrf-token";

/// Per-request timeout applied by the HTTP client
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of device state for the probe
#[async_trait]
pub trait ControllerClient: Send + Sync {
    /// Fetches every device currently known to the controller
    async fn list_access_points(&mut self) -> Result<Vec<AccessPoint>, ControllerError>;
}

/// Controller client speaking the UniFi Network REST API
pub struct UnifiController {
    http: Client,
    base_url: Url,
    username: String,
    password: String,
    site_id: String,
    version: ControllerVersion,
    csrf_token: Option<String>,
}

impl std::fmt::Debug for UnifiController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiController")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("site_id", &self.site_id)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl UnifiController {
    /// Builds a client without contacting the controller
    pub fn new(config: &ControllerConfig) -> Result<Self, ControllerError> {
        let base_url = controller_base_url(&config.url, config.port)?;

        if !config.ssl {
            warn!(
                "Certificate verification disabled for controller {} (ssl=false)",
                base_url
            );
        }

        let http = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.ssl)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ControllerError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
            site_id: config.site_id.clone(),
            version: config.version,
            csrf_token: None,
        })
    }

    /// Builds a client and logs in, failing if the controller refuses
    pub async fn connect(config: &ControllerConfig) -> Result<Self, ControllerError> {
        let mut controller = Self::new(config)?;
        controller.login().await?;
        Ok(controller)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Authenticates and stores the session cookie (and CSRF token on UniFi OS)
    pub async fn login(&mut self) -> Result<(), ControllerError> {
        let url = self.url_for(self.version.login_path());
        debug!(
            "Logging in to controller at {} as '{}' (version={:?})",
            url, self.username, self.version
        );

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await
            .map_err(|source| ControllerError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControllerError::LoginRejected {
                username: self.username.clone(),
                status: status.as_u16(),
            });
        }

        self.csrf_token = response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        info!(
            "Logged in to controller {} (site={}, csrf_token={})",
            self.base_url,
            self.site_id,
            self.csrf_token.is_some()
        );
        Ok(())
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn device_url(&self) -> String {
        self.url_for(&format!(
            "{}/api/s/{}/stat/device",
            self.version.api_prefix(),
            self.site_id
        ))
    }

    async fn get_device_body(&self, url: &str) -> Result<(StatusCode, String), ControllerError> {
        let mut request = self.http.get(url);
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ControllerError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ControllerError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok((status, body))
    }
}

#[async_trait]
impl ControllerClient for UnifiController {
    async fn list_access_points(&mut self) -> Result<Vec<AccessPoint>, ControllerError> {
        let url = self.device_url();
        let (mut status, mut body) = self.get_device_body(&url).await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!("Controller session expired at {} - logging in again", url);
            self.login().await?;
            (status, body) = self.get_device_body(&url).await?;
        }

        if !status.is_success() {
            return Err(ControllerError::Status {
                url,
                status: status.as_u16(),
            });
        }

        trace!("Device response from {} ({} bytes)", url, body.len());
        let devices = parse_device_response(&body).map_err(|error| match error {
            DeviceResponseError::Api(message) => ControllerError::Api { message },
            DeviceResponseError::Decode(message) => ControllerError::Decode {
                url: url.clone(),
                message,
            },
        })?;

        debug!("Controller reported {} devices", devices.len());
        Ok(devices)
    }
}

/// Resolves the controller base URL from the configured `url` and `port`
///
/// A bare host gets `https://` and the configured port; a full URL is used as
/// written.
pub fn controller_base_url(url: &str, port: u16) -> Result<Url, ControllerError> {
    let url = url.trim().trim_end_matches('/');
    let candidate = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}:{port}")
    };

    Url::parse(&candidate).map_err(|error| ControllerError::InvalidConfig {
        message: format!("controller url '{candidate}': {error}"),
    })
}

/// Failure to turn a `stat/device` response body into devices
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceResponseError {
    /// The controller answered with `meta.rc != "ok"`
    Api(String),
    /// The body was not the expected JSON envelope
    Decode(String),
}

#[derive(Debug, Default, Deserialize)]
struct ApiMeta {
    #[serde(default)]
    rc: String,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    meta: ApiMeta,
    #[serde(default)]
    data: Vec<RawDevice>,
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mac: Option<String>,
    #[serde(default)]
    stat: Option<Value>,
}

/// Parses the `{meta, data}` envelope returned by `stat/device`
///
/// Devices without a name fall back to their MAC address; devices with
/// neither are skipped. A missing or non-object `stat` becomes an empty
/// mapping.
pub fn parse_device_response(body: &str) -> Result<Vec<AccessPoint>, DeviceResponseError> {
    let envelope: ApiEnvelope =
        serde_json::from_str(body).map_err(|error| DeviceResponseError::Decode(error.to_string()))?;

    if !envelope.meta.rc.is_empty() && envelope.meta.rc != "ok" {
        return Err(DeviceResponseError::Api(
            envelope
                .meta
                .msg
                .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
        ));
    }

    let mut devices = Vec::with_capacity(envelope.data.len());
    for raw in envelope.data {
        let name = match raw.name.filter(|name| !name.is_empty()).or(raw.mac) {
            Some(name) => name,
            None => {
                warn!("Skipping controller device with neither name nor mac");
                continue;
            }
        };

        let stat: RawStats = match raw.stat {
            Some(Value::Object(map)) => raw_stats_from_json(map),
            Some(Value::Null) | None => RawStats::new(),
            Some(other) => {
                warn!(
                    "Device '{}' has a non-object stat field ({}) - treating as empty",
                    name,
                    json_kind(&other)
                );
                RawStats::new()
            }
        };

        devices.push(AccessPoint::new(name, stat));
    }

    Ok(devices)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
