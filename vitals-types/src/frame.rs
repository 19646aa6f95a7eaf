//! Frame - one cycle's telemetry sample.

use crate::{Reading, Value};

/// One cycle's incoming telemetry, one [`Reading`] per channel in schema order.
///
/// Frames may be sparse: channels that did not report this cycle are
/// [`Reading::Unobserved`].
///
/// # Example
///
/// ```rust
/// use vitals_types::{Frame, Reading};
///
/// let frame = Frame::builder().observe(1.0).skip().observe("NOMINAL_OPS").build();
/// assert_eq!(frame.observed_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Frame {
    readings: Vec<Reading>,
}

impl Frame {
    /// Create a frame from readings in schema order.
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    /// A frame of `len` channels where nothing was observed.
    pub fn unobserved(len: usize) -> Self {
        Self {
            readings: vec![Reading::Unobserved; len],
        }
    }

    /// Create a builder for constructing frames channel by channel.
    pub fn builder() -> FrameBuilder {
        FrameBuilder::new()
    }

    /// Number of channels in the frame.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reading for one channel.
    pub fn get(&self, index: usize) -> Option<&Reading> {
        self.readings.get(index)
    }

    /// Iterate over readings in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Number of channels carrying a value this cycle.
    pub fn observed_count(&self) -> usize {
        self.readings.iter().filter(|r| r.is_observed()).count()
    }
}

impl From<Vec<Reading>> for Frame {
    fn from(readings: Vec<Reading>) -> Self {
        Self::new(readings)
    }
}

impl FromIterator<Reading> for Frame {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}

/// Builder for constructing `Frame` instances.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    readings: Vec<Reading>,
}

impl FrameBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observed value for the next channel.
    pub fn observe(mut self, value: impl Into<Value>) -> Self {
        self.readings.push(Reading::Observed(value.into()));
        self
    }

    /// Mark the next channel as not updated this cycle.
    pub fn skip(mut self) -> Self {
        self.readings.push(Reading::Unobserved);
        self
    }

    /// Finish the frame.
    pub fn build(self) -> Frame {
        Frame::new(self.readings)
    }
}
