//! # unifi-collector
//!
//! Polls a UniFi controller for device statistics and republishes them to
//! InfluxDB on a fixed, drift-compensated cadence.
//!
//! ## Architecture
//!
//! - **`collectors::unifi`**: controller client and `DeviceProbe`
//! - **`collectors::stats`**: `StatExtractor`, numeric filtering and per-port classification
//! - **`storage`**: `MetricsSink`, the InfluxDB writer and line protocol encoding
//! - **`scheduler`**: `CollectionLoop`, cycle timing and reports
//! - **`config`**: typed configuration loading
//! - **`models`**: devices, raw stat values and measurements
//!
//! Data flows `CollectionLoop → DeviceProbe → StatExtractor → MetricsSink`
//! once per interval.

pub mod collectors;
pub mod config;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod storage;

pub use config::AppConfig;
pub use scheduler::CollectionLoop;
