//! Engine configuration.
//!
//! The engine is described by a TOML file: the fusion weights, the ordered
//! channel list with each channel's test, and the reasoning constructs to
//! build. Any key can be overridden from the environment with the `VITALS`
//! prefix and `__` as the nesting separator (e.g. `VITALS_FUSION__PRIOR=0.6`).
//!
//! ```toml
//! [fusion]
//! prior = 0.5
//! nominal = 0.5
//! caution = -1.0
//! warning = -3.0
//!
//! [[channels]]
//! name = "time"
//!
//! [[channels]]
//! name = "battery_voltage"
//! stale_after = 5
//! test = { kind = "feasibility", warning_low = 22.0, caution_low = 24.0, caution_high = 29.0, warning_high = 30.0 }
//!
//! [[constructs]]
//! name = "window"
//! kind = "sliding_window"
//! params = { window = 20 }
//! ```

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::checks::CheckConfig;
use crate::construct::ConstructSpec;
use crate::error::ConfigurationError;
use crate::schema::TestSpec;
use crate::status::FusionWeights;

/// One `[[channels]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    /// Cycles without a fresh value after which the channel reports no data.
    #[serde(default)]
    pub stale_after: Option<u64>,
    #[serde(default)]
    pub test: CheckConfig,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub fusion: FusionWeights,
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub constructs: Vec<ConstructSpec>,
}

impl EngineConfig {
    /// Load from a file, with environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("VITALS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parse TOML text directly, without environment overrides.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        let config = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Channel names in schema order.
    pub fn headers(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name.clone()).collect()
    }

    /// Instantiate every channel's test, in schema order.
    pub fn test_specs(&self) -> Result<Vec<TestSpec>, ConfigurationError> {
        self.channels
            .iter()
            .map(|c| {
                let spec = TestSpec::boxed(c.test.build(&c.name)?);
                Ok(match c.stale_after {
                    Some(cycles) => spec.stale_after(cycles),
                    None => spec,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use vitals_types::Value;

    fn sample_toml() -> &'static str {
        r#"
        [fusion]
        prior = 0.6
        warning = -4.0

        [[channels]]
        name = "time"

        [[channels]]
        name = "battery_voltage"
        stale_after = 5
        test = { kind = "feasibility", warning_low = 22.0, caution_low = 24.0, caution_high = 29.0, warning_high = 30.0, mnemonic = "BATT" }

        [[channels]]
        name = "mode"
        test = { kind = "discrete", caution = ["SAFE"], warning = ["FAULT"] }

        [[constructs]]
        name = "window"
        kind = "sliding_window"
        params = { window = 20 }

        [[constructs]]
        name = "power_window"
        kind = "sliding_window"
        scopes = ["power"]
        "#
    }

    #[test]
    fn test_parse_full_config() {
        let config = EngineConfig::from_toml_str(sample_toml()).unwrap();

        assert_eq!(config.headers(), vec!["time", "battery_voltage", "mode"]);
        assert_eq!(config.fusion.prior, 0.6);
        assert_eq!(config.fusion.warning, -4.0);
        // Unset weights fall back to defaults
        assert_eq!(config.fusion.nominal, FusionWeights::default().nominal);

        assert_eq!(config.channels[0].test, CheckConfig::Noop);
        assert_eq!(config.channels[1].stale_after, Some(5));
        assert_eq!(
            config.channels[2].test,
            CheckConfig::Discrete {
                caution: vec![Value::from("SAFE")],
                warning: vec![Value::from("FAULT")],
                mnemonic: None,
            }
        );

        assert_eq!(config.constructs.len(), 2);
        assert_eq!(config.constructs[0].scopes, vec!["status"]);
        assert_eq!(config.constructs[0].params["window"], serde_json::json!(20));
        assert_eq!(config.constructs[1].scopes, vec!["power"]);
    }

    #[test]
    fn test_test_specs_match_channels() {
        let config = EngineConfig::from_toml_str(sample_toml()).unwrap();
        let specs = config.test_specs().unwrap();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[1].staleness_limit(), Some(5));
        assert_eq!(specs[0].staleness_limit(), None);
    }

    #[test]
    fn test_invalid_test_limits_rejected() {
        let config = EngineConfig::from_toml_str(
            r#"
            [[channels]]
            name = "temp"
            test = { kind = "feasibility", warning_low = 50.0, caution_low = 0.0, caution_high = 10.0, warning_high = 20.0 }
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.test_specs(),
            Err(ConfigurationError::InvalidTest { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(file, "{}", sample_toml()).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.channels.len(), 3);
    }

    #[test]
    fn test_env_override() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(file, "{}", sample_toml()).unwrap();

        std::env::set_var("VITALS_FUSION__CAUTION", "-1.5");
        let config = EngineConfig::load(file.path());
        std::env::remove_var("VITALS_FUSION__CAUTION");

        let config = config.unwrap();
        assert_eq!(config.fusion.caution, -1.5);
        // Values the environment does not touch come from the file
        assert_eq!(config.fusion.prior, 0.6);
    }

    #[test]
    fn test_missing_channels_is_load_error() {
        let err = EngineConfig::from_toml_str("[fusion]\nprior = 0.5\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::Load(_)));
    }
}
