//! Device probe
//!
//! Wraps a [`ControllerClient`] and exposes the two questions the collection
//! loop asks: which devices exist, and what are a device's latest stats. Every
//! call performs a full re-fetch from the controller, so the cost of one call
//! is proportional to the number of devices on the site regardless of which
//! device is asked for.

use log::{debug, error, trace, warn};
use std::collections::HashMap;

use super::client::ControllerClient;
use super::errors::ProbeError;
use crate::models::{AccessPoint, RawStats};

/// Pulls device state from the controller
pub struct DeviceProbe {
    client: Box<dyn ControllerClient>,
    /// Devices from the most recent successful refresh, keyed by name
    devices: HashMap<String, AccessPoint>,
    /// Number of refreshes attempted
    refresh_count: u64,
}

impl DeviceProbe {
    pub fn new(client: Box<dyn ControllerClient>) -> Self {
        Self {
            client,
            devices: HashMap::new(),
            refresh_count: 0,
        }
    }

    /// Refreshes from the controller and returns every known device name, sorted
    pub async fn list_devices(&mut self) -> Result<Vec<String>, ProbeError> {
        self.refresh().await?;

        let mut names: Vec<String> = self.devices.keys().cloned().collect();
        names.sort();
        debug!(
            "Controller lists {} devices after refresh #{}: {:?}",
            names.len(),
            self.refresh_count,
            names
        );
        Ok(names)
    }

    /// Refreshes from the controller and returns the raw stats of one device
    pub async fn get_stats(&mut self, device_name: &str) -> Result<RawStats, ProbeError> {
        self.refresh().await?;

        match self.devices.get(device_name) {
            Some(device) => {
                trace!(
                    "Found device '{}' with {} raw stats (refresh #{})",
                    device_name,
                    device.stat.len(),
                    self.refresh_count
                );
                Ok(device.stat.clone())
            }
            None => {
                warn!(
                    "Device '{}' missing from controller response (refresh #{}, known_devices={})",
                    device_name,
                    self.refresh_count,
                    self.devices.len()
                );
                Err(ProbeError::DeviceNotFound {
                    device: device_name.to_string(),
                    known_devices: self.devices.len(),
                })
            }
        }
    }

    /// Number of devices held from the last refresh
    pub fn cached_device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// Re-fetches all device state, dropping the previous set on failure
    async fn refresh(&mut self) -> Result<(), ProbeError> {
        self.refresh_count += 1;

        match self.client.list_access_points().await {
            Ok(access_points) => {
                let mut devices = HashMap::with_capacity(access_points.len());
                for access_point in access_points {
                    if let Some(previous) = devices.insert(access_point.name.clone(), access_point)
                    {
                        debug!(
                            "Duplicate device name '{}' in controller response - keeping the later entry",
                            previous.name
                        );
                    }
                }
                self.devices = devices;
                Ok(())
            }
            Err(controller_error) => {
                error!(
                    "Controller refresh #{} failed - discarding {} cached devices: {}",
                    self.refresh_count,
                    self.devices.len(),
                    controller_error
                );
                self.devices.clear();
                Err(controller_error.into())
            }
        }
    }
}
