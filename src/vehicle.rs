//! The vehicle representation: one merged view of the telemetry stream, its
//! health status and the reasoning built on top of it.
//!
//! ```text
//! frame ──▶ MergedState ──▶ TestSuite ──▶ StatusFuser
//!                │
//!                └────────▶ ConstructRegistry
//! ```
//!
//! [`VehicleRepresentation::update`] is the only mutator. Every query reads
//! the results published by the last completed cycle.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};
use vitals_types::{Frame, Mnemonic, Reading, Severity};

use crate::config::EngineConfig;
use crate::construct::{
    CollectedState, ConstructCatalog, ConstructRegistry, ConstructSpec, ReasoningArtifact,
    ReasoningConstruct, Scope,
};
use crate::error::{ConfigurationError, ConstructFailure, ShapeMismatch, TestEvaluationFailure};
use crate::history::StatusHistory;
use crate::merge::MergedState;
use crate::schema::{ChannelSchema, TestSpec};
use crate::status::{FusionWeights, OverallStatus, StatusFuser};
use crate::suite::{SuiteResult, TestSuite};

/// Step of the update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Merging,
    Testing,
    Fusing,
    Reasoning,
}

/// Recoverable failures from the last completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub cycle: u64,
    pub test_failures: Vec<TestEvaluationFailure>,
    pub construct_failures: Vec<ConstructFailure>,
}

impl Diagnostics {
    /// Returns true if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.test_failures.is_empty() && self.construct_failures.is_empty()
    }
}

/// Builder for [`VehicleRepresentation`].
pub struct VehicleBuilder {
    headers: Vec<String>,
    tests: Vec<TestSpec>,
    specs: Vec<ConstructSpec>,
    instances: Vec<(Box<dyn ReasoningConstruct>, Vec<String>)>,
    weights: FusionWeights,
}

impl VehicleBuilder {
    fn new(headers: Vec<String>, tests: Vec<TestSpec>) -> Self {
        Self {
            headers,
            tests,
            specs: Vec::new(),
            instances: Vec::new(),
            weights: FusionWeights::default(),
        }
    }

    /// Add a construct to be built through the catalog.
    pub fn construct(mut self, spec: ConstructSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Add several constructs, in order.
    pub fn constructs(mut self, specs: impl IntoIterator<Item = ConstructSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Add an already built construct. Registered after catalog-built ones.
    pub fn with_construct<I, S>(mut self, construct: Box<dyn ReasoningConstruct>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instances
            .push((construct, scopes.into_iter().map(Into::into).collect()));
        self
    }

    /// Override the default fusion weights.
    pub fn weights(mut self, weights: FusionWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Validate everything and build the engine.
    pub fn build(self, catalog: &ConstructCatalog) -> Result<VehicleRepresentation, ConfigurationError> {
        let schema = ChannelSchema::new(self.headers, self.tests)?;
        let fuser = StatusFuser::new(self.weights)?;

        let mut registry = ConstructRegistry::from_specs(&self.specs, schema.headers(), catalog)?;
        for (construct, scopes) in self.instances {
            registry.register(construct, scopes)?;
        }

        info!(
            channels = schema.len(),
            constructs = registry.len(),
            "vehicle representation ready"
        );

        let merged = MergedState::new(schema.len());
        let last_suite = SuiteResult::no_data(schema.headers());
        Ok(VehicleRepresentation {
            suite: TestSuite::new(schema),
            merged,
            fuser,
            registry,
            last_suite,
            history: StatusHistory::new(),
            diagnostics: Diagnostics::default(),
            phase: Phase::Idle,
            cycle: 0,
        })
    }
}

/// Orchestrates merge, test, fusion and reasoning for each incoming frame.
#[derive(Debug)]
pub struct VehicleRepresentation {
    suite: TestSuite,
    merged: MergedState,
    fuser: StatusFuser,
    registry: ConstructRegistry,
    last_suite: SuiteResult,
    history: StatusHistory,
    diagnostics: Diagnostics,
    phase: Phase,
    cycle: u64,
}

impl VehicleRepresentation {
    /// Build an engine from headers, their tests and construct definitions.
    ///
    /// Fails if `headers` and `tests` differ in length, if two constructs
    /// share a name, or if a construct kind is not in `catalog`.
    pub fn new(
        headers: Vec<String>,
        tests: Vec<TestSpec>,
        constructs: Vec<ConstructSpec>,
        catalog: &ConstructCatalog,
    ) -> Result<Self, ConfigurationError> {
        Self::builder(headers, tests).constructs(constructs).build(catalog)
    }

    /// Start building an engine with custom weights or constructs.
    pub fn builder(headers: Vec<String>, tests: Vec<TestSpec>) -> VehicleBuilder {
        VehicleBuilder::new(headers, tests)
    }

    /// Build an engine from a loaded configuration file.
    pub fn from_config(
        config: &EngineConfig,
        catalog: &ConstructCatalog,
    ) -> Result<Self, ConfigurationError> {
        Self::builder(config.headers(), config.test_specs()?)
            .constructs(config.constructs.iter().cloned())
            .weights(config.fusion)
            .build(catalog)
    }

    /// Run one full cycle: merge, test, fuse, reason.
    ///
    /// A frame of the wrong width is rejected before any state changes.
    /// Test and construct failures do not fail the call; they are available
    /// from [`diagnostics`](Self::diagnostics) afterwards.
    pub fn update(&mut self, frame: &Frame) -> Result<&Diagnostics, ShapeMismatch> {
        let cycle = self.cycle + 1;

        self.enter(Phase::Merging, cycle);
        if let Err(e) = self.merged.merge(frame) {
            warn!(cycle, error = %e, "rejected frame");
            self.phase = Phase::Idle;
            return Err(e);
        }

        self.enter(Phase::Testing, cycle);
        let suite = self.suite.execute(&self.merged);

        self.enter(Phase::Fusing, cycle);
        let status = self.fuser.fuse(&suite);

        self.enter(Phase::Reasoning, cycle);
        let construct_failures = self.registry.drive_all(self.merged.values());

        self.diagnostics = Diagnostics {
            cycle,
            test_failures: suite.failures().to_vec(),
            construct_failures,
        };
        self.last_suite = suite;
        self.history.record(cycle, &status);
        self.cycle = cycle;
        self.enter(Phase::Idle, cycle);

        debug!(
            cycle,
            severity = %status.severity,
            confidence = status.confidence,
            "cycle complete"
        );
        Ok(&self.diagnostics)
    }

    fn enter(&mut self, phase: Phase, cycle: u64) {
        debug!(cycle, phase = ?phase, "phase");
        self.phase = phase;
    }

    /// Channel names in schema order.
    pub fn headers(&self) -> &[String] {
        self.suite.headers()
    }

    /// Merged state snapshot, one reading per channel.
    pub fn current_data(&self) -> &[Reading] {
        self.merged.values()
    }

    /// Value of channel 0, conventionally the timestamp.
    pub fn current_time(&self) -> Option<&Reading> {
        self.merged.get(0)
    }

    /// Worst channel severity from the last cycle.
    pub fn overall_status(&self) -> Severity {
        self.fuser.current().severity
    }

    /// Fused confidence in `[0, 1]` that the vehicle is healthy.
    pub fn bayesian_status(&self) -> f64 {
        self.fuser.current().confidence
    }

    /// Severity and confidence from the last cycle.
    pub fn status(&self) -> OverallStatus {
        self.fuser.current()
    }

    /// Channels at caution or worse with their mnemonics, in schema order.
    pub fn faulting_mnemonics(&self) -> Vec<(String, Mnemonic)> {
        self.last_suite.faulting_mnemonics()
    }

    /// Per-channel verdicts from the last cycle.
    pub fn channel_statuses(&self) -> &SuiteResult {
        &self.last_suite
    }

    /// Reasoning artifacts for the constructs in `scope`.
    ///
    /// Constructs that failed this cycle are left out; see
    /// [`state_report`](Self::state_report) for the failures themselves.
    pub fn state_information(&self, scope: &Scope) -> BTreeMap<String, ReasoningArtifact> {
        self.registry.collect_state(scope).artifacts
    }

    /// Reasoning artifacts plus any construct that failed to render.
    pub fn state_report(&self, scope: &Scope) -> CollectedState {
        self.registry.collect_state(scope)
    }

    /// Test and construct failures from the last cycle.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Overall status over recent cycles.
    pub fn history(&self) -> &StatusHistory {
        &self.history
    }

    /// Current step of the update cycle.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of completed cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Registered construct names, in registration order.
    pub fn construct_names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }
}
