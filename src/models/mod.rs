pub mod device;
pub mod measurement;
pub mod stat_value;

pub use device::AccessPoint;
pub use measurement::{
    ClassifiedStats, Direction, Measurement, MeasurementBatch, PortMetric, DATA_ALL, DATA_TAG,
    DEVICE_TAG, PORT_TAG,
};
pub use stat_value::{raw_stats_from_json, RawStats, StatValue};
