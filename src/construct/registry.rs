//! Construct factories and the registry that drives built constructs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vitals_types::Reading;

use super::{ReasoningArtifact, ReasoningConstruct, Scope, SlidingWindow, STATUS_SCOPE};
use crate::error::{ConfigurationError, ConstructCall, ConstructError, ConstructFailure};

/// A construct entry from the configuration file.
///
/// ```toml
/// [[constructs]]
/// name = "power_window"
/// kind = "sliding_window"
/// scopes = ["status", "power"]
/// params = { window = 20 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConstructSpec {
    /// Component name; must be unique across the registry.
    pub name: String,
    /// Factory key in the [`ConstructCatalog`].
    pub kind: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Free-form parameters handed to the factory.
    #[serde(default)]
    pub params: serde_json::Value,
}

fn default_scopes() -> Vec<String> {
    vec![STATUS_SCOPE.to_string()]
}

impl ConstructSpec {
    /// Create a spec in the status scope with no parameters.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            scopes: default_scopes(),
            params: serde_json::Value::Null,
        }
    }

    /// Replace the scope tags.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the factory parameters.
    pub fn params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// Everything a factory gets to build one construct.
#[derive(Debug, Clone, Copy)]
pub struct ConstructContext<'a> {
    pub name: &'a str,
    pub headers: &'a [String],
    pub params: &'a serde_json::Value,
}

impl ConstructContext<'_> {
    /// Read an optional unsigned integer parameter.
    pub fn param_u64(&self, key: &str) -> Result<Option<u64>, ConstructError> {
        match self.params.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or_else(|| {
                ConstructError::new(format!("parameter '{}' must be a non-negative integer", key))
            }),
        }
    }
}

/// Builds a construct from its context.
pub type ConstructFactory = Box<
    dyn Fn(&ConstructContext<'_>) -> Result<Box<dyn ReasoningConstruct>, ConstructError>
        + Send
        + Sync,
>;

/// Maps construct kinds to factories. Resolved once, at engine construction.
#[derive(Default)]
pub struct ConstructCatalog {
    factories: BTreeMap<String, ConstructFactory>,
}

impl ConstructCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog preloaded with the constructs shipped in this crate.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register(SlidingWindow::KIND, |ctx| {
            SlidingWindow::from_context(ctx).map(|c| Box::new(c) as Box<dyn ReasoningConstruct>)
        });
        catalog
    }

    /// Register a factory under `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ConstructContext<'_>) -> Result<Box<dyn ReasoningConstruct>, ConstructError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
        self
    }

    /// Build the construct described by `spec`.
    pub fn instantiate(
        &self,
        spec: &ConstructSpec,
        headers: &[String],
    ) -> Result<Box<dyn ReasoningConstruct>, ConfigurationError> {
        let factory =
            self.factories
                .get(&spec.kind)
                .ok_or_else(|| ConfigurationError::UnknownConstructKind {
                    name: spec.name.clone(),
                    kind: spec.kind.clone(),
                })?;

        let ctx = ConstructContext {
            name: &spec.name,
            headers,
            params: &spec.params,
        };
        factory(&ctx).map_err(|source| ConfigurationError::ConstructInit {
            name: spec.name.clone(),
            source,
        })
    }
}

impl fmt::Debug for ConstructCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructCatalog")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Artifacts gathered from a state query, plus any construct that failed to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectedState {
    pub artifacts: BTreeMap<String, ReasoningArtifact>,
    pub failures: Vec<ConstructFailure>,
}

struct Entry {
    construct: Box<dyn ReasoningConstruct>,
    scopes: BTreeSet<String>,
}

/// Owns every reasoning construct, in registration order.
#[derive(Default)]
pub struct ConstructRegistry {
    entries: Vec<Entry>,
    /// Constructs whose last update failed; left out of state queries until
    /// they update cleanly again.
    excluded: BTreeSet<String>,
}

impl ConstructRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register every spec through the catalog, in order.
    pub fn from_specs(
        specs: &[ConstructSpec],
        headers: &[String],
        catalog: &ConstructCatalog,
    ) -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        for spec in specs {
            let construct = catalog.instantiate(spec, headers)?;
            registry.register(construct, spec.scopes.iter().cloned())?;
        }
        Ok(registry)
    }

    /// Add a construct. Fails if its component name is already taken.
    pub fn register<I, S>(
        &mut self,
        construct: Box<dyn ReasoningConstruct>,
        scopes: I,
    ) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = construct.component_name();
        if self.entries.iter().any(|e| e.construct.component_name() == name) {
            return Err(ConfigurationError::DuplicateConstruct(name.to_string()));
        }
        let scopes: BTreeSet<String> = scopes.into_iter().map(Into::into).collect();
        info!(construct = name, scopes = ?scopes, "registered reasoning construct");
        self.entries.push(Entry { construct, scopes });
        Ok(())
    }

    /// Feed one merged frame to every construct, in registration order.
    ///
    /// A failing construct does not stop the others; its failure is returned.
    pub fn drive_all(&mut self, frame: &[Reading]) -> Vec<ConstructFailure> {
        let mut failures = Vec::new();
        self.excluded.clear();

        for entry in &mut self.entries {
            let name = entry.construct.component_name().to_string();
            match entry.construct.update(frame) {
                Ok(()) => debug!(construct = %name, "construct updated"),
                Err(e) => {
                    warn!(construct = %name, error = %e, "construct update failed");
                    self.excluded.insert(name.clone());
                    failures.push(ConstructFailure {
                        component: name,
                        call: ConstructCall::Update,
                        message: e.to_string(),
                    });
                }
            }
        }
        failures
    }

    /// Render every construct selected by `scope`.
    ///
    /// Constructs that failed their last update, or fail to render now, are
    /// left out of the artifacts. Render failures are reported alongside.
    pub fn collect_state(&self, scope: &Scope) -> CollectedState {
        let mut state = CollectedState::default();

        for entry in self.entries.iter().filter(|e| scope.matches(&e.scopes)) {
            let name = entry.construct.component_name();
            if self.excluded.contains(name) {
                continue;
            }
            match entry.construct.render_reasoning() {
                Ok(artifact) => {
                    state.artifacts.insert(name.to_string(), artifact);
                }
                Err(e) => {
                    warn!(construct = name, error = %e, "construct render failed");
                    state.failures.push(ConstructFailure {
                        component: name.to_string(),
                        call: ConstructCall::RenderReasoning,
                        message: e.to_string(),
                    });
                }
            }
        }
        state
    }

    /// Component names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.construct.component_name())
    }

    /// Number of registered constructs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ConstructRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructRegistry")
            .field("constructs", &self.names().collect::<Vec<_>>())
            .field("excluded", &self.excluded)
            .finish()
    }
}
