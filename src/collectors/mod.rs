pub mod stats;
pub mod unifi;

pub use stats::StatExtractor;
pub use unifi::{ControllerClient, DeviceProbe, ProbeError, UnifiController};
