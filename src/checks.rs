//! Built-in channel tests.
//!
//! Deployments usually bring their own [`ChannelTest`] implementations; these
//! cover the common cases and back the `[[channels]]` entries of the
//! configuration file.

use serde::Deserialize;
use vitals_types::{ChannelStatus, Value};

use crate::error::{CheckError, ConfigurationError};
use crate::suite::ChannelTest;

/// Always nominal. Used for timestamp and bookkeeping channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl ChannelTest for Noop {
    fn evaluate(&self, _channel: &str, _value: &Value) -> Result<ChannelStatus, CheckError> {
        Ok(ChannelStatus::nominal())
    }
}

/// Limit check on a numeric channel.
///
/// Values inside `[caution_low, caution_high]` are nominal, values inside
/// `[warning_low, warning_high]` but outside the caution band raise a
/// caution, anything beyond raises a warning. Mnemonics are suffixed with
/// `_LOW` or `_HIGH`.
#[derive(Debug, Clone, PartialEq)]
pub struct Feasibility {
    warning_low: f64,
    caution_low: f64,
    caution_high: f64,
    warning_high: f64,
    mnemonic: String,
}

impl Feasibility {
    /// Create a limit check. Bounds must be finite and ordered
    /// `warning_low <= caution_low <= caution_high <= warning_high`.
    pub fn new(
        warning_low: f64,
        caution_low: f64,
        caution_high: f64,
        warning_high: f64,
        mnemonic: impl Into<String>,
    ) -> Result<Self, CheckError> {
        let bounds = [warning_low, caution_low, caution_high, warning_high];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(CheckError::new("limits must be finite"));
        }
        if !bounds.windows(2).all(|w| w[0] <= w[1]) {
            return Err(CheckError::new(format!(
                "limits out of order: {} <= {} <= {} <= {} does not hold",
                warning_low, caution_low, caution_high, warning_high
            )));
        }
        Ok(Self {
            warning_low,
            caution_low,
            caution_high,
            warning_high,
            mnemonic: mnemonic.into(),
        })
    }
}

impl ChannelTest for Feasibility {
    fn evaluate(&self, _channel: &str, value: &Value) -> Result<ChannelStatus, CheckError> {
        let v = value
            .as_f64()
            .ok_or_else(|| CheckError::new(format!("expected a number, got '{}'", value)))?;
        if v.is_nan() {
            return Err(CheckError::new("value is NaN"));
        }

        let status = if v < self.warning_low {
            ChannelStatus::warning(format!("{}_LOW", self.mnemonic))
        } else if v > self.warning_high {
            ChannelStatus::warning(format!("{}_HIGH", self.mnemonic))
        } else if v < self.caution_low {
            ChannelStatus::caution(format!("{}_LOW", self.mnemonic))
        } else if v > self.caution_high {
            ChannelStatus::caution(format!("{}_HIGH", self.mnemonic))
        } else {
            ChannelStatus::nominal()
        };
        Ok(status)
    }
}

/// Enumerated state check: listed values raise a caution or a warning,
/// anything else is nominal.
#[derive(Debug, Clone, PartialEq)]
pub struct Discrete {
    caution: Vec<Value>,
    warning: Vec<Value>,
    mnemonic: String,
}

impl Discrete {
    /// Create a check that raises `caution` or `warning` for the listed values.
    pub fn new(caution: Vec<Value>, warning: Vec<Value>, mnemonic: impl Into<String>) -> Self {
        Self {
            caution,
            warning,
            mnemonic: mnemonic.into(),
        }
    }
}

impl ChannelTest for Discrete {
    fn evaluate(&self, _channel: &str, value: &Value) -> Result<ChannelStatus, CheckError> {
        if self.warning.contains(value) {
            Ok(ChannelStatus::warning(self.mnemonic.as_str()))
        } else if self.caution.contains(value) {
            Ok(ChannelStatus::caution(self.mnemonic.as_str()))
        } else {
            Ok(ChannelStatus::nominal())
        }
    }
}

/// Test definition as written in the configuration file.
///
/// ```toml
/// [[channels]]
/// name = "battery_voltage"
/// test = { kind = "feasibility", warning_low = 22.0, caution_low = 24.0, caution_high = 29.0, warning_high = 30.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckConfig {
    #[default]
    Noop,
    Feasibility {
        warning_low: f64,
        caution_low: f64,
        caution_high: f64,
        warning_high: f64,
        #[serde(default)]
        mnemonic: Option<String>,
    },
    Discrete {
        #[serde(default)]
        caution: Vec<Value>,
        #[serde(default)]
        warning: Vec<Value>,
        #[serde(default)]
        mnemonic: Option<String>,
    },
}

impl CheckConfig {
    /// Instantiate the test for `channel`. Mnemonics default to the
    /// upper-cased channel name.
    pub fn build(&self, channel: &str) -> Result<Box<dyn ChannelTest>, ConfigurationError> {
        let default_mnemonic = || channel.to_uppercase();
        match self {
            CheckConfig::Noop => Ok(Box::new(Noop)),
            CheckConfig::Feasibility {
                warning_low,
                caution_low,
                caution_high,
                warning_high,
                mnemonic,
            } => {
                let mnemonic = mnemonic.clone().unwrap_or_else(default_mnemonic);
                Feasibility::new(*warning_low, *caution_low, *caution_high, *warning_high, mnemonic)
                    .map(|t| Box::new(t) as Box<dyn ChannelTest>)
                    .map_err(|e| ConfigurationError::InvalidTest {
                        channel: channel.to_string(),
                        reason: e.to_string(),
                    })
            }
            CheckConfig::Discrete {
                caution,
                warning,
                mnemonic,
            } => {
                let mnemonic = mnemonic.clone().unwrap_or_else(default_mnemonic);
                Ok(Box::new(Discrete::new(caution.clone(), warning.clone(), mnemonic)))
            }
        }
    }
}
