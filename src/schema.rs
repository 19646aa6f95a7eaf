//! Channel schema: ordered channel names paired with their tests.

use std::fmt;

use vitals_types::{ChannelStatus, Value};

use crate::error::{CheckError, ConfigurationError};
use crate::suite::ChannelTest;

/// A channel's test plus its freshness policy.
pub struct TestSpec {
    test: Box<dyn ChannelTest>,
    stale_after: Option<u64>,
}

impl TestSpec {
    /// Wrap a test with no staleness limit.
    pub fn new(test: impl ChannelTest + 'static) -> Self {
        Self::boxed(Box::new(test))
    }

    /// Wrap an already boxed test.
    pub fn boxed(test: Box<dyn ChannelTest>) -> Self {
        Self {
            test,
            stale_after: None,
        }
    }

    /// Build a spec from a plain closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<ChannelStatus, CheckError> + Send + Sync + 'static,
    {
        Self::new(f)
    }

    /// Report no data once the channel has gone `cycles` updates without a
    /// fresh observation.
    pub fn stale_after(mut self, cycles: u64) -> Self {
        self.stale_after = Some(cycles);
        self
    }

    /// Cycles after which the channel's value counts as stale.
    pub fn staleness_limit(&self) -> Option<u64> {
        self.stale_after
    }

    /// The wrapped test.
    pub fn test(&self) -> &dyn ChannelTest {
        self.test.as_ref()
    }
}

impl fmt::Debug for TestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSpec")
            .field("stale_after", &self.stale_after)
            .finish_non_exhaustive()
    }
}

/// Ordered channel identifiers, index-aligned with their tests.
///
/// Index 0 is conventionally the timestamp channel. Immutable once built.
#[derive(Debug)]
pub struct ChannelSchema {
    headers: Vec<String>,
    tests: Vec<TestSpec>,
}

impl ChannelSchema {
    /// Pair headers with tests. Fails if the two lists differ in length.
    pub fn new(headers: Vec<String>, tests: Vec<TestSpec>) -> Result<Self, ConfigurationError> {
        if headers.len() != tests.len() {
            return Err(ConfigurationError::SchemaMismatch {
                headers: headers.len(),
                tests: tests.len(),
            });
        }
        Ok(Self { headers, tests })
    }

    /// Channel names in schema order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate over `(name, test)` pairs in schema order.
    pub fn channels(&self) -> impl Iterator<Item = (&str, &TestSpec)> {
        self.headers.iter().map(String::as_str).zip(self.tests.iter())
    }
}
