//! Sliding lookback window over the merged telemetry.
//!
//! Keeps the last `window` merged values per channel and summarises them.
//! Learned diagnosers consume exactly this kind of header-keyed lookback, so
//! the window doubles as a reference construct for plugin authors.

use std::collections::VecDeque;

use serde_json::{json, Map};
use vitals_types::{Reading, Value};

use super::{ConstructContext, ReasoningArtifact, ReasoningConstruct};
use crate::error::ConstructError;

/// Default number of frames kept per channel.
const DEFAULT_WINDOW: usize = 10;

#[derive(Debug, Clone)]
pub struct SlidingWindow {
    name: String,
    headers: Vec<String>,
    window: usize,
    samples: Vec<VecDeque<Value>>,
    frames_seen: u64,
}

impl SlidingWindow {
    /// Catalog key for this construct.
    pub const KIND: &'static str = "sliding_window";

    /// Largest accepted window, per channel.
    pub const MAX_WINDOW: usize = 1 << 20;

    /// Create a window keeping up to `window` samples per channel.
    ///
    /// Fails if `window` is zero or larger than [`Self::MAX_WINDOW`].
    pub fn new(name: impl Into<String>, headers: &[String], window: usize) -> Result<Self, ConstructError> {
        if window == 0 {
            return Err(ConstructError::new("window must be at least 1"));
        }
        if window > Self::MAX_WINDOW {
            return Err(ConstructError::new(format!(
                "window {} exceeds the maximum of {}",
                window,
                Self::MAX_WINDOW
            )));
        }
        Ok(Self {
            name: name.into(),
            headers: headers.to_vec(),
            window,
            samples: vec![VecDeque::new(); headers.len()],
            frames_seen: 0,
        })
    }

    /// Build from catalog context. Reads the optional `window` parameter.
    pub fn from_context(ctx: &ConstructContext<'_>) -> Result<Self, ConstructError> {
        let window = match ctx.param_u64("window")? {
            Some(w) => usize::try_from(w)
                .map_err(|_| ConstructError::new(format!("window {} is too large", w)))?,
            None => DEFAULT_WINDOW,
        };
        Self::new(ctx.name, ctx.headers, window)
    }

    /// Samples currently held for a channel, oldest first.
    pub fn samples(&self, channel: &str) -> Option<&VecDeque<Value>> {
        let index = self.headers.iter().position(|h| h == channel)?;
        self.samples.get(index)
    }

    fn summarize(samples: &VecDeque<Value>) -> serde_json::Value {
        let latest = samples.back().map(|v| json!(v));
        let numbers: Vec<f64> = samples.iter().filter_map(Value::as_f64).collect();

        let mut summary = Map::new();
        summary.insert("latest".to_string(), latest.unwrap_or(serde_json::Value::Null));
        summary.insert("samples".to_string(), json!(samples.len()));

        if !numbers.is_empty() {
            let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
            summary.insert("min".to_string(), json!(min));
            summary.insert("max".to_string(), json!(max));
            summary.insert("mean".to_string(), json!(mean));
        }
        serde_json::Value::Object(summary)
    }
}

impl ReasoningConstruct for SlidingWindow {
    fn component_name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, frame: &[Reading]) -> Result<(), ConstructError> {
        if frame.len() != self.headers.len() {
            return Err(ConstructError::new(format!(
                "frame has {} channels, window tracks {}",
                frame.len(),
                self.headers.len()
            )));
        }

        for (slot, reading) in self.samples.iter_mut().zip(frame) {
            if let Reading::Observed(value) = reading {
                slot.push_back(value.clone());
                if slot.len() > self.window {
                    slot.pop_front();
                }
            }
        }
        self.frames_seen += 1;
        Ok(())
    }

    fn render_reasoning(&self) -> Result<ReasoningArtifact, ConstructError> {
        let channels: Map<String, serde_json::Value> = self
            .headers
            .iter()
            .zip(&self.samples)
            .map(|(name, samples)| (name.clone(), Self::summarize(samples)))
            .collect();

        Ok(json!({
            "window": self.window,
            "frames_seen": self.frames_seen,
            "channels": channels,
        }))
    }
}
