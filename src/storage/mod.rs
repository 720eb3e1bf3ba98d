pub mod errors;
pub mod influx;
pub mod line_protocol;
pub mod sink;

pub use errors::SinkError;
pub use influx::{store_base_url, InfluxWriter};
pub use sink::{MeasurementWriter, MetricsSink};
