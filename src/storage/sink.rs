//! Metrics sink
//!
//! [`MetricsSink`] is the collection loop's only view of the store: one call,
//! one discrete write. It keeps running counters so the loop can report
//! per-cycle outcomes without tracking them itself.

use async_trait::async_trait;
use log::{debug, trace};

use super::errors::SinkError;
use crate::models::Measurement;

/// Transport that delivers measurements to a time-series store
#[async_trait]
pub trait MeasurementWriter: Send + Sync {
    /// Checks that the store is reachable
    async fn ping(&self) -> Result<(), SinkError>;

    /// Writes a single measurement
    async fn write(&self, measurement: &Measurement) -> Result<(), SinkError>;
}

/// Publishes measurements through a [`MeasurementWriter`]
pub struct MetricsSink {
    writer: Box<dyn MeasurementWriter>,
    writes_ok: u64,
    writes_failed: u64,
}

impl MetricsSink {
    pub fn new(writer: Box<dyn MeasurementWriter>) -> Self {
        Self {
            writer,
            writes_ok: 0,
            writes_failed: 0,
        }
    }

    /// Verifies the store can be reached; used once at bootstrap
    pub async fn check_connection(&self) -> Result<(), SinkError> {
        self.writer.ping().await
    }

    /// Writes one measurement
    ///
    /// Measurements without fields are refused locally with
    /// [`SinkError::EmptyMeasurement`] rather than sent to the store.
    pub async fn write(&mut self, measurement: &Measurement) -> Result<(), SinkError> {
        if measurement.has_no_fields() {
            self.writes_failed += 1;
            return Err(SinkError::EmptyMeasurement {
                measurement: measurement.name.clone(),
            });
        }

        trace!(
            "Writing measurement '{}' tags={:?} fields={}",
            measurement.name,
            measurement.tags,
            measurement.fields.len()
        );

        match self.writer.write(measurement).await {
            Ok(()) => {
                self.writes_ok += 1;
                Ok(())
            }
            Err(error) => {
                self.writes_failed += 1;
                debug!(
                    "Write of '{}' failed ({} failures so far): {}",
                    measurement.name, self.writes_failed, error
                );
                Err(error)
            }
        }
    }

    /// Successful writes since the sink was created
    pub fn writes_ok(&self) -> u64 {
        self.writes_ok
    }

    /// Failed writes since the sink was created
    pub fn writes_failed(&self) -> u64 {
        self.writes_failed
    }
}
