//! Per-channel test evaluation.
//!
//! The [`TestSuite`] owns the [`ChannelSchema`] and evaluates every channel's
//! test against the merged state each cycle. It only ever reads the state.

use serde::Serialize;
use tracing::warn;
use vitals_types::{ChannelStatus, Mnemonic, Reading, Severity, Value};

use crate::error::{CheckError, TestEvaluationFailure};
use crate::merge::MergedState;
use crate::schema::ChannelSchema;

/// A health test for a single channel.
///
/// Implementations classify the channel's current merged value. They are
/// never called for a channel that has not been observed yet.
pub trait ChannelTest: Send + Sync {
    fn evaluate(&self, channel: &str, value: &Value) -> Result<ChannelStatus, CheckError>;
}

impl<F> ChannelTest for F
where
    F: Fn(&str, &Value) -> Result<ChannelStatus, CheckError> + Send + Sync,
{
    fn evaluate(&self, channel: &str, value: &Value) -> Result<ChannelStatus, CheckError> {
        self(channel, value)
    }
}

/// One channel's verdict within a suite result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelResult {
    pub channel: String,
    #[serde(flatten)]
    pub status: ChannelStatus,
}

/// Verdicts for every channel from a single cycle, in schema order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SuiteResult {
    channels: Vec<ChannelResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<TestEvaluationFailure>,
}

impl SuiteResult {
    /// Every channel at no data, as reported before the first cycle.
    pub fn no_data(headers: &[String]) -> Self {
        Self {
            channels: headers
                .iter()
                .map(|h| ChannelResult {
                    channel: h.clone(),
                    status: ChannelStatus::no_data(),
                })
                .collect(),
            failures: Vec::new(),
        }
    }

    /// Build a result from `(channel, status)` pairs in schema order.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = (String, ChannelStatus)>,
    {
        Self {
            channels: statuses
                .into_iter()
                .map(|(channel, status)| ChannelResult { channel, status })
                .collect(),
            failures: Vec::new(),
        }
    }

    /// Per-channel results in schema order.
    pub fn channels(&self) -> &[ChannelResult] {
        &self.channels
    }

    /// Status of one channel by name.
    pub fn get(&self, channel: &str) -> Option<&ChannelStatus> {
        self.channels
            .iter()
            .find(|c| c.channel == channel)
            .map(|c| &c.status)
    }

    /// Severity of every channel, in schema order.
    pub fn severities(&self) -> impl Iterator<Item = Severity> + '_ {
        self.channels.iter().map(|c| c.status.severity)
    }

    /// Tests that errored this cycle. Their channels report no data.
    pub fn failures(&self) -> &[TestEvaluationFailure] {
        &self.failures
    }

    /// Channels at or above `min` severity with their fault mnemonics, in schema order.
    ///
    /// A channel whose test gave no mnemonic is listed under its own name.
    pub fn status_specific_mnemonics(&self, min: Severity) -> Vec<(String, Mnemonic)> {
        let mut result = Vec::new();
        for c in self.channels.iter().filter(|c| c.status.severity >= min) {
            if c.status.mnemonics.is_empty() {
                result.push((c.channel.clone(), Mnemonic::new(c.channel.as_str())));
            } else {
                for m in &c.status.mnemonics {
                    result.push((c.channel.clone(), m.clone()));
                }
            }
        }
        result
    }

    /// Channels at caution or worse.
    pub fn faulting_mnemonics(&self) -> Vec<(String, Mnemonic)> {
        self.status_specific_mnemonics(Severity::Caution)
    }
}

/// Runs every channel test in the schema against the merged state.
#[derive(Debug)]
pub struct TestSuite {
    schema: ChannelSchema,
}

impl TestSuite {
    /// Create a runner over `schema`.
    pub fn new(schema: ChannelSchema) -> Self {
        Self { schema }
    }

    /// The schema being evaluated.
    pub fn schema(&self) -> &ChannelSchema {
        &self.schema
    }

    /// Channel names in schema order.
    pub fn headers(&self) -> &[String] {
        self.schema.headers()
    }

    /// Evaluate the whole suite.
    ///
    /// Unobserved or stale channels are reported as no data without running
    /// their test. A test that errors is recorded as a failure and its channel
    /// reported as no data; the remaining channels are still evaluated.
    pub fn execute(&self, state: &MergedState) -> SuiteResult {
        let mut channels = Vec::with_capacity(self.schema.len());
        let mut failures = Vec::new();

        for (index, (name, spec)) in self.schema.channels().enumerate() {
            let status = match state.get(index) {
                Some(Reading::Observed(value)) if !Self::is_stale(spec.staleness_limit(), state.age(index)) => {
                    match spec.test().evaluate(name, value) {
                        Ok(status) => status,
                        Err(e) => {
                            warn!(channel = name, error = %e, "channel test failed");
                            failures.push(TestEvaluationFailure {
                                channel: name.to_string(),
                                message: e.to_string(),
                            });
                            ChannelStatus::no_data()
                        }
                    }
                }
                _ => ChannelStatus::no_data(),
            };
            channels.push(ChannelResult {
                channel: name.to_string(),
                status,
            });
        }

        SuiteResult { channels, failures }
    }

    fn is_stale(limit: Option<u64>, age: Option<u64>) -> bool {
        match (limit, age) {
            (Some(limit), Some(age)) => age > limit,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{Feasibility, Noop};
    use crate::schema::TestSpec;
    use vitals_types::Frame;

    fn suite(tests: Vec<(&str, TestSpec)>) -> TestSuite {
        let (headers, specs): (Vec<_>, Vec<_>) =
            tests.into_iter().map(|(h, t)| (h.to_string(), t)).unzip();
        TestSuite::new(ChannelSchema::new(headers, specs).unwrap())
    }

    fn voltage_limits() -> TestSpec {
        TestSpec::new(Feasibility::new(0.0, 2.0, 8.0, 10.0, "VOLT").unwrap())
    }

    #[test]
    fn test_unobserved_channel_is_no_data_without_running_test() {
        let suite = suite(vec![
            ("t", TestSpec::new(Noop)),
            (
                "v",
                TestSpec::from_fn(|_, _| panic!("test must not run on an unobserved channel")),
            ),
        ]);
        let mut state = MergedState::new(2);
        state.merge(&Frame::builder().observe(0.0).skip().build()).unwrap();

        let result = suite.execute(&state);
        assert_eq!(result.get("t").unwrap().severity, Severity::Nominal);
        assert_eq!(result.get("v").unwrap().severity, Severity::NoData);
    }

    #[test]
    fn test_failing_test_reports_no_data_and_is_recorded() {
        let suite = suite(vec![
            (
                "broken",
                TestSpec::from_fn(|_, _| Err(CheckError::new("sensor table missing"))),
            ),
            ("v", voltage_limits()),
        ]);
        let mut state = MergedState::new(2);
        state.merge(&Frame::builder().observe(1.0).observe(9.5).build()).unwrap();

        let result = suite.execute(&state);
        assert_eq!(result.get("broken").unwrap().severity, Severity::NoData);
        assert_eq!(result.get("v").unwrap().severity, Severity::Caution);
        assert_eq!(result.failures().len(), 1);
        assert_eq!(result.failures()[0].channel, "broken");
        assert_eq!(result.failures()[0].message, "sensor table missing");
    }

    #[test]
    fn test_stale_channel_reports_no_data() {
        let suite = suite(vec![
            ("t", TestSpec::new(Noop)),
            ("v", voltage_limits().stale_after(1)),
        ]);
        let mut state = MergedState::new(2);
        state.merge(&Frame::builder().observe(0.0).observe(5.0).build()).unwrap();
        assert_eq!(suite.execute(&state).get("v").unwrap().severity, Severity::Nominal);

        state.merge(&Frame::builder().observe(1.0).skip().build()).unwrap();
        assert_eq!(suite.execute(&state).get("v").unwrap().severity, Severity::Nominal);

        state.merge(&Frame::builder().observe(2.0).skip().build()).unwrap();
        assert_eq!(suite.execute(&state).get("v").unwrap().severity, Severity::NoData);
        // The carried value itself is still there
        assert_eq!(state.get(1), Some(&Reading::observed(5.0)));
    }

    #[test]
    fn test_status_specific_mnemonics_in_schema_order() {
        let result = SuiteResult::from_statuses(vec![
            ("t".to_string(), ChannelStatus::nominal()),
            ("a".to_string(), ChannelStatus::warning("A_HIGH")),
            ("b".to_string(), ChannelStatus::no_data()),
            ("c".to_string(), ChannelStatus::new(Severity::Caution)),
        ]);

        assert_eq!(
            result.faulting_mnemonics(),
            vec![
                ("a".to_string(), Mnemonic::from("A_HIGH")),
                ("c".to_string(), Mnemonic::from("c")),
            ]
        );
        assert_eq!(
            result.status_specific_mnemonics(Severity::Warning),
            vec![("a".to_string(), Mnemonic::from("A_HIGH"))]
        );
    }
}
