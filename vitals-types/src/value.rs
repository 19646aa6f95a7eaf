//! Telemetry values and per-channel readings.

use std::fmt;

/// A single telemetry value as delivered by the vehicle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Boolean discrete (switch states, flags).
    Flag(bool),
    /// Any numeric measurement. Integers are widened to `f64`.
    Number(f64),
    /// Enumerated or free-form text (modes, state names).
    Text(String),
}

impl Value {
    /// Returns the numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the flag value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Flag(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Flag(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One channel's slot in a frame or in the merged state.
///
/// `Unobserved` means "no update this cycle" inside a frame, and "never seen"
/// inside the merged state.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "Option<Value>", into = "Option<Value>")
)]
pub enum Reading {
    Observed(Value),
    #[default]
    Unobserved,
}

impl Reading {
    /// Create an observed reading.
    pub fn observed(value: impl Into<Value>) -> Self {
        Reading::Observed(value.into())
    }

    /// Returns true if a value was observed.
    pub fn is_observed(&self) -> bool {
        matches!(self, Reading::Observed(_))
    }

    /// Borrow the underlying value, if observed.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Reading::Observed(v) => Some(v),
            Reading::Unobserved => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Observed(v) => v.fmt(f),
            Reading::Unobserved => f.write_str("-"),
        }
    }
}

impl From<Option<Value>> for Reading {
    fn from(v: Option<Value>) -> Self {
        match v {
            Some(value) => Reading::Observed(value),
            None => Reading::Unobserved,
        }
    }
}

impl From<Reading> for Option<Value> {
    fn from(r: Reading) -> Self {
        match r {
            Reading::Observed(value) => Some(value),
            Reading::Unobserved => None,
        }
    }
}
