//! Channel-based frame source.
//!
//! Receives frames over a tokio mpsc channel, for producers that push
//! telemetry (a radio link decoder, a bus subscriber) rather than having it
//! replayed from disk.

use tokio::sync::mpsc::{self, error::TryRecvError};
use vitals_types::Frame;

use super::FrameSource;

/// A frame source fed by an mpsc channel.
///
/// Every frame sent is delivered exactly once, in order. The source is
/// exhausted once all senders are dropped and the buffer is drained.
///
/// # Example
///
/// ```
/// use vitals::{ChannelSource, Frame, FrameSource};
///
/// let (tx, mut source) = ChannelSource::create(16, "downlink");
/// tx.try_send(Frame::builder().observe(0.0).build()).unwrap();
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<Frame>,
    description: String,
    exhausted: bool,
}

impl ChannelSource {
    /// Create a source from an existing receiver.
    pub fn new(receiver: mpsc::Receiver<Frame>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            exhausted: false,
        }
    }

    /// Create a bounded channel pair. Returns (sender, source).
    pub fn create(buffer: usize, source_description: &str) -> (mpsc::Sender<Frame>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx, source_description))
    }
}

impl FrameSource for ChannelSource {
    fn poll(&mut self) -> Option<Frame> {
        if self.exhausted {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.exhausted = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        // Transport failures belong to the producer side
        None
    }

    fn exhausted(&self) -> bool {
        self.exhausted
    }
}
