//! Statistic extraction
//!
//! Turns raw controller statistics into the numeric maps that become
//! measurements. See [`extractor::StatExtractor`].

pub mod extractor;

pub use extractor::{parse_port_metric, port_label, StatExtractor};

#[cfg(test)]
pub mod tests;
