//! Reasoning constructs: pluggable, stateful diagnosers driven by the merged
//! telemetry stream.
//!
//! The engine knows constructs only through the [`ReasoningConstruct`] trait.
//! Rule engines, statistical learners and learned policies all plug in the
//! same way: the [`ConstructCatalog`] maps a construct kind to a factory, and
//! the [`ConstructRegistry`] owns the built instances and drives them once per
//! cycle.

mod registry;
mod window;

pub use registry::{
    CollectedState, ConstructCatalog, ConstructContext, ConstructFactory, ConstructRegistry,
    ConstructSpec,
};
pub use window::SlidingWindow;

use std::collections::BTreeSet;

use vitals_types::Reading;

use crate::error::ConstructError;

/// Structured explanation produced by a construct.
pub type ReasoningArtifact = serde_json::Value;

/// Scope tag given to constructs that contribute to status reporting.
pub const STATUS_SCOPE: &str = "status";

/// A named, stateful reasoning plugin.
///
/// `update` is called with every merged frame, in order, exactly once per
/// cycle. `render_reasoning` must not change the construct's state and must
/// work without a fresh frame.
pub trait ReasoningConstruct: Send + Sync {
    fn component_name(&self) -> &str;

    fn update(&mut self, frame: &[Reading]) -> Result<(), ConstructError>;

    fn render_reasoning(&self) -> Result<ReasoningArtifact, ConstructError>;
}

/// Selects which constructs a state query reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every registered construct.
    All,
    /// Constructs carrying at least one of these tags.
    Tags(BTreeSet<String>),
}

impl Scope {
    /// Status-relevant constructs only. This is the default.
    pub fn status() -> Self {
        Self::tags([STATUS_SCOPE])
    }

    /// Constructs carrying any of the given tags.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scope::Tags(tags.into_iter().map(Into::into).collect())
    }

    /// Returns true if a construct with `tags` is in scope.
    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        match self {
            Scope::All => true,
            Scope::Tags(wanted) => !wanted.is_disjoint(tags),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::status()
    }
}
