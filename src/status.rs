//! Fusion of per-channel verdicts into the overall mission status.
//!
//! The discrete status is the worst channel severity. The continuous
//! ("bayesian") status is a confidence in `[0, 1]` that the vehicle is
//! healthy: starting from a prior, every observed channel shifts the
//! log-odds by the evidence weight of its severity. Channels with no data
//! abstain.

use serde::{Deserialize, Serialize};
use vitals_types::Severity;

use crate::error::ConfigurationError;
use crate::suite::SuiteResult;

/// Evidence weights for the confidence computation.
///
/// Weights are log-odds shifts. They must satisfy
/// `nominal >= 0 >= caution >= warning` so that a channel regressing in
/// severity can never raise the confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    /// Confidence before any channel has reported.
    pub prior: f64,
    pub nominal: f64,
    pub caution: f64,
    pub warning: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            prior: 0.5,
            nominal: 0.5,
            caution: -1.0,
            warning: -3.0,
        }
    }
}

impl FusionWeights {
    /// Check the weights keep confidence monotone under regression.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let all = [self.prior, self.nominal, self.caution, self.warning];
        if all.iter().any(|w| !w.is_finite()) {
            return Err(ConfigurationError::InvalidWeights(
                "weights must be finite".to_string(),
            ));
        }
        if self.prior <= 0.0 || self.prior >= 1.0 {
            return Err(ConfigurationError::InvalidWeights(format!(
                "prior must be strictly between 0 and 1, got {}",
                self.prior
            )));
        }
        if !(self.nominal >= 0.0 && 0.0 >= self.caution && self.caution >= self.warning) {
            return Err(ConfigurationError::InvalidWeights(format!(
                "expected nominal >= 0 >= caution >= warning, got {} / {} / {}",
                self.nominal, self.caution, self.warning
            )));
        }
        Ok(())
    }

    /// Log-odds evidence contributed by one channel.
    pub fn evidence(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Nominal => self.nominal,
            Severity::NoData => 0.0,
            Severity::Caution => self.caution,
            Severity::Warning => self.warning,
        }
    }
}

/// Fused status for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallStatus {
    pub severity: Severity,
    pub confidence: f64,
}

impl OverallStatus {
    /// Status before any frame: no data, confidence at the prior.
    pub fn initial(weights: &FusionWeights) -> Self {
        Self {
            severity: Severity::NoData,
            confidence: weights.prior,
        }
    }

    /// Fuse a set of channel severities.
    ///
    /// An empty set fuses to the initial status.
    pub fn from_severities<I>(weights: &FusionWeights, severities: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        let mut worst: Option<Severity> = None;
        let mut log_odds = logit(weights.prior);

        for severity in severities {
            worst = worst.max(Some(severity));
            log_odds += weights.evidence(severity);
        }

        Self {
            severity: worst.unwrap_or(Severity::NoData),
            confidence: sigmoid(log_odds),
        }
    }
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Holds the authoritative overall status.
#[derive(Debug, Clone)]
pub struct StatusFuser {
    weights: FusionWeights,
    current: OverallStatus,
}

impl StatusFuser {
    /// Create a fuser. Fails if the weights are invalid.
    pub fn new(weights: FusionWeights) -> Result<Self, ConfigurationError> {
        weights.validate()?;
        Ok(Self {
            current: OverallStatus::initial(&weights),
            weights,
        })
    }

    /// Fuse a suite result and publish it as the current status.
    pub fn fuse(&mut self, suite: &SuiteResult) -> OverallStatus {
        let next = OverallStatus::from_severities(&self.weights, suite.severities());
        self.current = next;
        next
    }

    /// The last published status.
    pub fn current(&self) -> OverallStatus {
        self.current
    }

    /// The weights in use.
    pub fn weights(&self) -> &FusionWeights {
        &self.weights
    }
}
