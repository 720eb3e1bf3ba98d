//! Numeric statistic extraction and per-port classification
//!
//! The extractor turns a device's raw statistics mapping into three numeric
//! maps: general counters, received bytes per port and transmitted bytes per
//! port. It is a pure function of its input: no state is kept between calls,
//! and the result does not depend on the order entries are visited in.

use log::trace;
use regex::Regex;
use std::sync::LazyLock;

use crate::models::{ClassifiedStats, Direction, PortMetric, RawStats, StatValue};

/// Matches `port_<digits>-rx_bytes` and `port_<digits>-tx_bytes` exactly
static PORT_BYTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(port_[0-9]+)-(rx|tx)_bytes$").expect("port byte pattern is a valid regex")
});

/// Splits device statistics into general counters and per-port byte counters
#[derive(Debug, Clone, Copy, Default)]
pub struct StatExtractor;

impl StatExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Classifies a raw statistics mapping
    ///
    /// Only finite floats are retained; every other value type is dropped
    /// without error. Retained entries whose name is a per-port byte counter
    /// go to the rx or tx map under their port label, all others stay in the
    /// general map under their original name.
    pub fn classify(&self, raw: &RawStats) -> ClassifiedStats {
        self.classify_entries(raw)
    }

    /// Classifies entries supplied in any order
    pub fn classify_entries<'a, I>(&self, entries: I) -> ClassifiedStats
    where
        I: IntoIterator<Item = (&'a String, &'a StatValue)>,
    {
        let mut classified = ClassifiedStats::default();
        let mut seen = 0usize;

        for (name, value) in entries {
            seen += 1;
            let Some(number) = value.as_finite_float() else {
                trace!("Dropping non-numeric stat '{}' ({})", name, value.kind());
                continue;
            };

            match parse_port_metric(name, number) {
                Some(PortMetric {
                    port,
                    direction: Direction::Rx,
                    value,
                }) => {
                    classified.rx.insert(port, value);
                }
                Some(PortMetric {
                    port,
                    direction: Direction::Tx,
                    value,
                }) => {
                    classified.tx.insert(port, value);
                }
                None => {
                    classified.general.insert(name.clone(), number);
                }
            }
        }

        trace!(
            "Classified {} raw stats: general={}, rx_ports={}, tx_ports={}",
            seen,
            classified.general.len(),
            classified.rx.len(),
            classified.tx.len()
        );

        classified
    }
}

/// Recognises a per-port byte counter by its stat name
///
/// Returns `None` for every name that is not exactly `port_<digits>-rx_bytes`
/// or `port_<digits>-tx_bytes`.
pub fn parse_port_metric(name: &str, value: f64) -> Option<PortMetric> {
    let captures = PORT_BYTES_RE.captures(name)?;
    let direction = match &captures[2] {
        "rx" => Direction::Rx,
        "tx" => Direction::Tx,
        _ => return None,
    };

    Some(PortMetric {
        port: port_label(&captures[1]),
        direction,
        value,
    })
}

/// Turns a port identifier into its display label: `port_3` becomes `Port 3`
///
/// Underscores become spaces, the first character is upper-cased and the rest
/// lower-cased.
pub fn port_label(port_id: &str) -> String {
    let spaced = port_id.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(entries: &[(&str, StatValue)]) -> RawStats {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_port_label() {
        assert_eq!(port_label("port_3"), "Port 3");
        assert_eq!(port_label("port_12"), "Port 12");
        assert_eq!(port_label(""), "");
    }

    #[test]
    fn test_parse_port_metric_directions() {
        let rx = parse_port_metric("port_7-rx_bytes", 123.0).unwrap();
        assert_eq!(rx.port, "Port 7");
        assert_eq!(rx.direction, Direction::Rx);
        assert_eq!(rx.value, 123.0);

        let tx = parse_port_metric("port_12-tx_bytes", 1.0).unwrap();
        assert_eq!(tx.port, "Port 12");
        assert_eq!(tx.direction, Direction::Tx);
    }

    #[test]
    fn test_parse_port_metric_rejects_near_misses() {
        assert!(parse_port_metric("port_-rx_bytes", 1.0).is_none());
        assert!(parse_port_metric("port_1-rx_packets", 1.0).is_none());
        assert!(parse_port_metric("port_1-rx_bytes-r", 1.0).is_none());
        assert!(parse_port_metric("xport_1-rx_bytes", 1.0).is_none());
        assert!(parse_port_metric("port_a-tx_bytes", 1.0).is_none());
        assert!(parse_port_metric("rx_bytes", 1.0).is_none());
    }

    #[test]
    fn test_classify_splits_general_and_ports() {
        let raw = stats(&[
            ("port_1-rx_bytes", StatValue::Float(100.0)),
            ("port_1-tx_bytes", StatValue::Float(50.0)),
            ("uptime", StatValue::Float(9999.0)),
        ]);

        let classified = StatExtractor::new().classify(&raw);

        assert_eq!(classified.general.len(), 1);
        assert_eq!(classified.general["uptime"], 9999.0);
        assert_eq!(classified.rx["Port 1"], 100.0);
        assert_eq!(classified.tx["Port 1"], 50.0);
        assert!(!classified.general.contains_key("port_1-rx_bytes"));
    }

    #[test]
    fn test_classify_drops_non_float_values() {
        let raw = stats(&[
            ("bytes", StatValue::Integer(10)),
            ("port_2-rx_bytes", StatValue::Integer(10)),
            ("site_id", StatValue::Text("default".into())),
            ("is_online", StatValue::Bool(true)),
            ("nothing", StatValue::Null),
            ("nan", StatValue::Float(f64::NAN)),
            ("ap", StatValue::Nested(Default::default())),
            ("loadavg", StatValue::Float(0.25)),
        ]);

        let classified = StatExtractor::new().classify(&raw);

        assert_eq!(classified.len(), 1);
        assert_eq!(classified.general["loadavg"], 0.25);
        assert!(classified.rx.is_empty());
    }

    #[test]
    fn test_classify_empty_input() {
        let classified = StatExtractor::new().classify(&RawStats::new());
        assert!(classified.is_empty());
    }
}
