use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::models::MeasurementBatch;

/// A device that produced no measurements in a cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDevice {
    pub device: String,
    /// Short error label, e.g. `device_not_found`
    pub kind: &'static str,
    pub reason: String,
}

/// Outcome of one poll cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Monotonic duration of the cycle, used for the sleep computation
    pub elapsed: Duration,
    pub batches: Vec<MeasurementBatch>,
    pub skipped: Vec<SkippedDevice>,
    pub writes_ok: u64,
    pub writes_failed: u64,
}

impl CycleReport {
    /// Devices whose stats were fetched and published
    pub fn devices_polled(&self) -> usize {
        self.batches.len()
    }

    pub fn devices_skipped(&self) -> usize {
        self.skipped.len()
    }

    pub fn batch_for(&self, device: &str) -> Option<&MeasurementBatch> {
        self.batches.iter().find(|batch| batch.device == device)
    }
}
