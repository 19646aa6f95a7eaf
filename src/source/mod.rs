//! Frame sources for driving the engine.
//!
//! A source yields decoded [`Frame`]s one at a time. Replaying a recorded
//! telemetry file and receiving frames pushed from another task look the same
//! to whatever loop feeds [`VehicleRepresentation::update`].
//!
//! [`VehicleRepresentation::update`]: crate::VehicleRepresentation::update

mod channel;
mod file;

pub use channel::ChannelSource;
pub use file::FileSource;

use std::fmt::Debug;

use vitals_types::Frame;

/// Trait for receiving telemetry frames from various sources.
///
/// # Example
///
/// ```no_run
/// use vitals::{FileSource, FrameSource};
///
/// let mut source = FileSource::new("frames.jsonl");
/// while let Some(frame) = source.poll() {
///     println!("{} observed", frame.observed_count());
/// }
/// ```
pub trait FrameSource: Send + Debug {
    /// Take the next available frame.
    ///
    /// Returns `None` when nothing is ready right now. Non-blocking.
    fn poll(&mut self) -> Option<Frame>;

    /// Human-readable description of the source.
    fn description(&self) -> &str;

    /// The most recent error, if any.
    fn error(&self) -> Option<&str>;

    /// True once the source will never yield another frame.
    fn exhausted(&self) -> bool;
}
