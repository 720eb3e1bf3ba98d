//! UniFi controller access
//!
//! ## Module Organization
//!
//! - `client`: the controller HTTP client and the `ControllerClient` seam
//! - `probe`: `DeviceProbe`, device enumeration and per-device stat lookup
//! - `errors`: controller and probe error types

pub mod client;
pub mod errors;
pub mod probe;

pub use client::{
    controller_base_url, parse_device_response, ControllerClient, DeviceResponseError,
    UnifiController,
};
pub use errors::{ControllerError, ProbeError};
pub use probe::DeviceProbe;

#[cfg(test)]
pub mod tests;
