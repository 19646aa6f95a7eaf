//! Channel health verdicts.

use std::fmt;

/// Discrete health severity, ordered from best to worst.
///
/// `NoData` ranks above `Nominal` (a silent channel is worse than a healthy
/// one) but below `Caution`, so a channel that never reported cannot mask an
/// active caution or warning elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Nominal,
    #[default]
    NoData,
    Caution,
    Warning,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Severity; 4] = [
        Severity::Nominal,
        Severity::NoData,
        Severity::Caution,
        Severity::Warning,
    ];

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Nominal => "OK",
            Severity::NoData => "----",
            Severity::Caution => "CAUT",
            Severity::Warning => "WARN",
        }
    }

    /// Whether this severity is an active fault (caution or worse).
    pub fn is_fault(&self) -> bool {
        *self >= Severity::Caution
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Symbolic fault identifier attached to an off-nominal channel status.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Mnemonic(String);

impl Mnemonic {
    /// Create a mnemonic.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The mnemonic text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mnemonic {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Mnemonic {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single channel's verdict for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelStatus {
    pub severity: Severity,

    /// Fault identifiers raised by the channel's test. Empty when nominal.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub mnemonics: Vec<Mnemonic>,
}

impl ChannelStatus {
    /// A status with no mnemonics.
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            mnemonics: Vec::new(),
        }
    }

    /// A nominal status.
    pub fn nominal() -> Self {
        Self::new(Severity::Nominal)
    }

    /// A no-data status.
    pub fn no_data() -> Self {
        Self::new(Severity::NoData)
    }

    /// A caution carrying one mnemonic.
    pub fn caution(mnemonic: impl Into<Mnemonic>) -> Self {
        Self::new(Severity::Caution).with_mnemonic(mnemonic)
    }

    /// A warning carrying one mnemonic.
    pub fn warning(mnemonic: impl Into<Mnemonic>) -> Self {
        Self::new(Severity::Warning).with_mnemonic(mnemonic)
    }

    /// Attach another fault mnemonic.
    pub fn with_mnemonic(mut self, mnemonic: impl Into<Mnemonic>) -> Self {
        self.mnemonics.push(mnemonic.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Nominal < Severity::NoData);
        assert!(Severity::NoData < Severity::Caution);
        assert!(Severity::Caution < Severity::Warning);

        let worst = [Severity::NoData, Severity::Warning, Severity::Nominal]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Severity::Warning));
    }

    #[test]
    fn test_is_fault() {
        assert!(!Severity::Nominal.is_fault());
        assert!(!Severity::NoData.is_fault());
        assert!(Severity::Caution.is_fault());
        assert!(Severity::Warning.is_fault());
    }

    #[test]
    fn test_channel_status_constructors() {
        let status = ChannelStatus::caution("TEMP_HIGH").with_mnemonic("HEATER_STUCK");
        assert_eq!(status.severity, Severity::Caution);
        assert_eq!(
            status.mnemonics,
            vec![Mnemonic::from("TEMP_HIGH"), Mnemonic::from("HEATER_STUCK")]
        );
        assert!(ChannelStatus::nominal().mnemonics.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_severity_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Severity::NoData).unwrap(), r#""no_data""#);
    }
}
