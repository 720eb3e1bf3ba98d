use serde::{Deserialize, Serialize};

use super::stat_value::RawStats;

/// A device managed by the controller together with its latest statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    /// Display name, falls back to the MAC address for unnamed devices
    pub name: String,
    /// Raw statistics mapping as reported in the device's `stat` object
    pub stat: RawStats,
}

impl AccessPoint {
    pub fn new(name: impl Into<String>, stat: RawStats) -> Self {
        Self {
            name: name.into(),
            stat,
        }
    }
}
