//! Error types for controller access
//!
//! [`ControllerError`] describes what went wrong talking to the controller;
//! [`ProbeError`] is what the collection loop sees and decides on. Both are
//! recoverable per device once the process is running.

use thiserror::Error;

/// Failures of the controller HTTP client
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Controller request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Controller returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Controller login rejected for user '{username}' (HTTP {status})")]
    LoginRejected { username: String, status: u16 },

    #[error("Controller API error: {message}")]
    Api { message: String },

    #[error("Could not decode controller response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid controller configuration: {message}")]
    InvalidConfig { message: String },
}

/// Failures surfaced by the device probe
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The refresh against the controller failed; the cached device set was dropped
    #[error("Controller unavailable: {reason}")]
    ControllerUnavailable { reason: String },

    /// The device was not part of the controller's answer after refresh
    #[error("Device '{device}' not found after refresh ({known_devices} devices known)")]
    DeviceNotFound {
        device: String,
        known_devices: usize,
    },
}

impl ProbeError {
    /// Short machine-friendly label used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::ControllerUnavailable { .. } => "controller_unavailable",
            ProbeError::DeviceNotFound { .. } => "device_not_found",
        }
    }
}

impl From<ControllerError> for ProbeError {
    fn from(error: ControllerError) -> Self {
        ProbeError::ControllerUnavailable {
            reason: error.to_string(),
        }
    }
}
