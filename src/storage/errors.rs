use thiserror::Error;

/// Failures writing to the time-series store
///
/// Every variant is scoped to a single write; the caller logs it and moves on
/// to the next measurement.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The store could not be reached or refused the write
    #[error("Store unavailable for measurement '{measurement}': {reason}")]
    Unavailable { measurement: String, reason: String },

    /// The measurement has no fields, which the store would reject
    #[error("Measurement '{measurement}' has no fields")]
    EmptyMeasurement { measurement: String },
}
