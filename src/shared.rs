//! Thread-safe handle to a vehicle representation.
//!
//! A whole update cycle runs under the write lock, so readers on other
//! threads see either the previous cycle's results or the new ones, never a
//! mix of both.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use vitals_types::{Frame, Mnemonic, Reading, Severity};

use crate::construct::{ReasoningArtifact, Scope};
use crate::error::ShapeMismatch;
use crate::status::OverallStatus;
use crate::vehicle::{Diagnostics, VehicleRepresentation};

/// Cloneable, lock-guarded [`VehicleRepresentation`].
#[derive(Debug, Clone)]
pub struct SharedVehicle {
    inner: Arc<RwLock<VehicleRepresentation>>,
}

impl SharedVehicle {
    /// Wrap an engine for sharing across threads.
    pub fn new(vehicle: VehicleRepresentation) -> Self {
        Self {
            inner: Arc::new(RwLock::new(vehicle)),
        }
    }

    /// Run one cycle as a single critical section.
    pub fn update(&self, frame: &Frame) -> Result<Diagnostics, ShapeMismatch> {
        let mut vehicle = self.inner.write();
        vehicle.update(frame).cloned()
    }

    /// Run `f` against a consistent view of the engine.
    pub fn read<R>(&self, f: impl FnOnce(&VehicleRepresentation) -> R) -> R {
        f(&self.inner.read())
    }

    /// Fused status from the last completed cycle.
    pub fn status(&self) -> OverallStatus {
        self.inner.read().status()
    }

    /// Discrete severity from the last completed cycle.
    pub fn overall_status(&self) -> Severity {
        self.inner.read().overall_status()
    }

    /// Fused confidence from the last completed cycle.
    pub fn bayesian_status(&self) -> f64 {
        self.inner.read().bayesian_status()
    }

    /// Copy of the merged state.
    pub fn current_data(&self) -> Vec<Reading> {
        self.inner.read().current_data().to_vec()
    }

    /// Channels at caution or worse, with their mnemonics.
    pub fn faulting_mnemonics(&self) -> Vec<(String, Mnemonic)> {
        self.inner.read().faulting_mnemonics()
    }

    /// Reasoning artifacts for the constructs in `scope`.
    pub fn state_information(&self, scope: &Scope) -> BTreeMap<String, ReasoningArtifact> {
        self.inner.read().state_information(scope)
    }
}
