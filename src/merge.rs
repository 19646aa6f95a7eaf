//! Carry-forward merging of sparse frames into the current state.

use vitals_types::{Frame, Reading};

use crate::error::ShapeMismatch;

/// Best known value per channel.
///
/// Each slot is either [`Reading::Unobserved`] (never seen) or the most recent
/// observed value, however many sparse frames have arrived since. Alongside
/// the values the state counts how many cycles each channel has gone without
/// a fresh observation.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedState {
    values: Vec<Reading>,
    ages: Vec<Option<u64>>,
}

impl MergedState {
    /// All channels unobserved.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![Reading::Unobserved; len],
            ages: vec![None; len],
        }
    }

    /// Merge a frame in place.
    ///
    /// Observed readings replace the stored value; unobserved readings leave it
    /// alone. A frame of the wrong width is rejected before anything changes.
    pub fn merge(&mut self, frame: &Frame) -> Result<(), ShapeMismatch> {
        if frame.len() != self.values.len() {
            return Err(ShapeMismatch {
                expected: self.values.len(),
                actual: frame.len(),
            });
        }

        for ((slot, age), reading) in self.values.iter_mut().zip(self.ages.iter_mut()).zip(frame) {
            match reading {
                Reading::Observed(_) => {
                    *slot = reading.clone();
                    *age = Some(0);
                }
                Reading::Unobserved => {
                    *age = age.map(|a| a + 1);
                }
            }
        }
        Ok(())
    }

    /// Best known reading for every channel, in schema order.
    pub fn values(&self) -> &[Reading] {
        &self.values
    }

    /// Best known reading for one channel.
    pub fn get(&self, index: usize) -> Option<&Reading> {
        self.values.get(index)
    }

    /// Cycles since channel `index` was last observed, `None` if never.
    pub fn age(&self, index: usize) -> Option<u64> {
        self.ages.get(index).copied().flatten()
    }

    /// Number of channels tracked.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_carries_forward() {
        let mut state = MergedState::new(3);

        state.merge(&Frame::builder().observe(0.0).observe(5.0).skip().build()).unwrap();
        assert_eq!(
            state.values(),
            &[Reading::observed(0.0), Reading::observed(5.0), Reading::Unobserved]
        );

        state.merge(&Frame::builder().observe(1.0).skip().observe(9.0).build()).unwrap();
        assert_eq!(
            state.values(),
            &[Reading::observed(1.0), Reading::observed(5.0), Reading::observed(9.0)]
        );
    }

    #[test]
    fn test_carry_forward_survives_many_sparse_frames() {
        let mut state = MergedState::new(2);
        state.merge(&Frame::builder().observe(1.0).observe(42.0).build()).unwrap();

        for t in 2..10 {
            state.merge(&Frame::builder().observe(t as f64).skip().build()).unwrap();
        }

        assert_eq!(state.get(1), Some(&Reading::observed(42.0)));
        assert_eq!(state.age(1), Some(8));
        assert_eq!(state.age(0), Some(0));
    }

    #[test]
    fn test_never_observed_has_no_age() {
        let mut state = MergedState::new(2);
        state.merge(&Frame::builder().observe(1.0).skip().build()).unwrap();
        assert_eq!(state.age(1), None);
        assert_eq!(state.get(1), Some(&Reading::Unobserved));
    }

    #[test]
    fn test_shape_mismatch_leaves_state_untouched() {
        let mut state = MergedState::new(2);
        state.merge(&Frame::builder().observe(1.0).observe(2.0).build()).unwrap();
        let before = state.clone();

        let err = state.merge(&Frame::builder().observe(7.0).build()).unwrap_err();
        assert_eq!(
            err,
            ShapeMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(state, before);
    }
}
