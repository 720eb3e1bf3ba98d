//! Measurements published to the time-series store
//!
//! A [`MeasurementBatch`] is everything one device contributes to a poll
//! cycle: a general measurement carrying every non-port numeric counter and
//! one measurement per port and direction for the byte counters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag key carrying the device name on every measurement
pub const DEVICE_TAG: &str = "device";
/// Tag key carrying the port label on per-port measurements
pub const PORT_TAG: &str = "port";
/// Tag key marking the general measurement
pub const DATA_TAG: &str = "data";
/// Value of [`DATA_TAG`] on the general measurement
pub const DATA_ALL: &str = "all";

/// Traffic direction of a per-port byte counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Bytes received on the port
    Rx,
    /// Bytes transmitted on the port
    Tx,
}

impl Direction {
    /// Field key used when the counter is written to the store
    pub fn field_name(self) -> &'static str {
        match self {
            Direction::Rx => "rx-bytes",
            Direction::Tx => "tx-bytes",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rx => write!(f, "rx"),
            Direction::Tx => write!(f, "tx"),
        }
    }
}

/// A per-port byte counter recognised in a device's statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortMetric {
    /// Display label such as `Port 3`
    pub port: String,
    pub direction: Direction,
    pub value: f64,
}

/// Result of classifying one device's numeric statistics
///
/// The three maps are disjoint by origin: every retained source entry lands in
/// exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedStats {
    /// Numeric stats that are not per-port byte counters, keyed by stat name
    pub general: BTreeMap<String, f64>,
    /// Received bytes keyed by port label
    pub rx: BTreeMap<String, f64>,
    /// Transmitted bytes keyed by port label
    pub tx: BTreeMap<String, f64>,
}

impl ClassifiedStats {
    /// Returns the port map for a direction
    pub fn ports(&self, direction: Direction) -> &BTreeMap<String, f64> {
        match direction {
            Direction::Rx => &self.rx,
            Direction::Tx => &self.tx,
        }
    }

    /// Total number of retained numeric entries across all three maps
    pub fn len(&self) -> usize {
        self.general.len() + self.rx.len() + self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named, tagged collection of numeric fields written in one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, f64>,
}

impl Measurement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: f64) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, f64>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Value of a tag, if present
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// True when the measurement carries no fields and cannot be stored
    pub fn has_no_fields(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Everything one device publishes in a poll cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementBatch {
    pub device: String,
    /// General numeric stats, named after the device and tagged `data=all`
    pub general: Measurement,
    /// One measurement per port carrying `rx-bytes`
    pub rx: Vec<Measurement>,
    /// One measurement per port carrying `tx-bytes`
    pub tx: Vec<Measurement>,
}

impl MeasurementBatch {
    /// Builds the measurements for a device from its classified stats
    ///
    /// Per-port measurements share `port_measurement` as their name and are
    /// distinguished by the `device` and `port` tags.
    pub fn from_classified(
        device: &str,
        classified: &ClassifiedStats,
        port_measurement: &str,
    ) -> Self {
        let general = Measurement::new(device)
            .with_tag(DEVICE_TAG, device)
            .with_tag(DATA_TAG, DATA_ALL)
            .with_fields(classified.general.clone());

        let port_measurements = |direction: Direction| -> Vec<Measurement> {
            classified
                .ports(direction)
                .iter()
                .map(|(port, value)| {
                    Measurement::new(port_measurement)
                        .with_tag(DEVICE_TAG, device)
                        .with_tag(PORT_TAG, port.as_str())
                        .with_field(direction.field_name(), *value)
                })
                .collect()
        };

        Self {
            device: device.to_string(),
            general,
            rx: port_measurements(Direction::Rx),
            tx: port_measurements(Direction::Tx),
        }
    }

    /// All measurements in write order: general first, then rx, then tx
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        std::iter::once(&self.general)
            .chain(self.rx.iter())
            .chain(self.tx.iter())
    }

    pub fn measurement_count(&self) -> usize {
        1 + self.rx.len() + self.tx.len()
    }
}
