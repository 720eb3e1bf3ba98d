//! Raw statistic values reported by the controller
//!
//! Device statistics arrive as a loosely typed JSON object: counters, flags,
//! version strings and nested sub-objects all live side by side. Each entry is
//! modelled as a [`StatValue`] so the extractor can ask an explicit question
//! ("is this a finite float?") instead of relying on implicit coercion.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Statistic name to raw value, as reported for a single device
pub type RawStats = BTreeMap<String, StatValue>;

/// A single raw statistic value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatValue {
    Null,
    Bool(bool),
    /// Whole number that fits in an `i64`
    Integer(i64),
    /// Whole number above `i64::MAX`
    Unsigned(u64),
    /// Number written with a fraction or exponent in the source document
    Float(f64),
    Text(String),
    List(Vec<StatValue>),
    Nested(BTreeMap<String, StatValue>),
}

impl StatValue {
    /// Returns the value when it is a finite floating-point number
    ///
    /// Integers are not widened; only values the controller reports as
    /// floats count as numeric stats.
    pub fn as_finite_float(&self) -> Option<f64> {
        match self {
            StatValue::Float(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    /// Short type name used in trace logging
    pub fn kind(&self) -> &'static str {
        match self {
            StatValue::Null => "null",
            StatValue::Bool(_) => "bool",
            StatValue::Integer(_) | StatValue::Unsigned(_) => "integer",
            StatValue::Float(_) => "float",
            StatValue::Text(_) => "text",
            StatValue::List(_) => "list",
            StatValue::Nested(_) => "nested",
        }
    }
}

impl From<Value> for StatValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => StatValue::Null,
            Value::Bool(flag) => StatValue::Bool(flag),
            Value::Number(number) => {
                if number.is_f64() {
                    // is_f64 guarantees as_f64 is Some
                    StatValue::Float(number.as_f64().unwrap_or(f64::NAN))
                } else if let Some(signed) = number.as_i64() {
                    StatValue::Integer(signed)
                } else if let Some(unsigned) = number.as_u64() {
                    StatValue::Unsigned(unsigned)
                } else {
                    StatValue::Null
                }
            }
            Value::String(text) => StatValue::Text(text),
            Value::Array(items) => StatValue::List(items.into_iter().map(StatValue::from).collect()),
            Value::Object(map) => StatValue::Nested(
                map.into_iter()
                    .map(|(key, value)| (key, StatValue::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Converts a JSON object into a statistics mapping
pub fn raw_stats_from_json(map: serde_json::Map<String, Value>) -> RawStats {
    map.into_iter()
        .map(|(key, value)| (key, StatValue::from(value)))
        .collect()
}
