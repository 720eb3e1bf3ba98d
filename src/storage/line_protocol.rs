//! InfluxDB line protocol encoding
//!
//! `measurement,tag=value,tag=value field=value,field=value`
//!
//! Tags are emitted in key order. Fields are always floats; no timestamp is
//! written, so the store stamps each point on arrival.

use super::errors::SinkError;
use crate::models::Measurement;

/// Encodes one measurement as a single line, without a trailing newline
pub fn encode(measurement: &Measurement) -> Result<String, SinkError> {
    if measurement.has_no_fields() {
        return Err(SinkError::EmptyMeasurement {
            measurement: measurement.name.clone(),
        });
    }

    let mut line = escape_measurement(&measurement.name);

    for (key, value) in &measurement.tags {
        // The store drops empty tag values, so they are skipped here as well
        if value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    let fields: Vec<String> = measurement
        .fields
        .iter()
        .map(|(key, value)| format!("{}={}", escape_key(key), format_float(*value)))
        .collect();
    line.push_str(&fields.join(","));

    Ok(line)
}

/// Escapes commas and spaces in a measurement name
fn escape_measurement(name: &str) -> String {
    escape(name, &[',', ' '])
}

/// Escapes commas, equals signs and spaces in tag keys, tag values and field keys
fn escape_key(key: &str) -> String {
    escape(key, &[',', '=', ' '])
}

fn escape(input: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Formats a float so the store parses it back as a float
///
/// Integral values are written with a trailing `.0`; an unsuffixed integer
/// is also a float in line protocol, this just keeps the payload unambiguous.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
