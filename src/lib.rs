//! # vitals
//!
//! A telemetry health engine. It keeps one coherent picture of a vehicle from
//! a stream of sparse frames, and judges how healthy that picture is.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      VehicleRepresentation                       │
//! │                                                                  │
//! │  ┌─────────┐   ┌─────────────┐   ┌───────────┐   ┌────────────┐  │
//! │  │ source  │──▶│    merge    │──▶│   suite   │──▶│   status   │  │
//! │  │ (frames)│   │(carry fwd)  │   │ (checks)  │   │  (fusion)  │  │
//! │  └─────────┘   └──────┬──────┘   └───────────┘   └────────────┘  │
//! │                       │                                          │
//! │                       ▼                                          │
//! │                ┌─────────────┐                                   │
//! │                │  construct  │◀── SlidingWindow | your own        │
//! │                │ (reasoning) │                                   │
//! │                └─────────────┘                                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`merge`]**: carries the last observed value of every channel forward
//! - **[`suite`]** and **[`checks`]**: per-channel tests producing a
//!   [`Severity`] and mnemonics
//! - **[`status`]**: fuses the channel verdicts into a worst-case severity
//!   and a Bayesian confidence
//! - **[`construct`]**: pluggable reasoning components driven with the merged
//!   state every cycle
//! - **[`source`]**: frame sources ([`FrameSource`]) for file replay and
//!   in-process channels
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! vitals --config engine.toml --frames frames.jsonl --export report.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use vitals::checks::{Feasibility, Noop};
//! use vitals::{ConstructCatalog, Frame, Severity, TestSpec, VehicleRepresentation};
//!
//! let mut vehicle = VehicleRepresentation::new(
//!     vec!["time".to_string(), "temp".to_string()],
//!     vec![
//!         TestSpec::new(Noop),
//!         TestSpec::new(Feasibility::new(-40.0, -20.0, 50.0, 70.0, "TEMP").unwrap()),
//!     ],
//!     Vec::new(),
//!     &ConstructCatalog::with_builtins(),
//! )
//! .unwrap();
//!
//! vehicle.update(&Frame::builder().observe(0.0).observe(21.5).build()).unwrap();
//! assert_eq!(vehicle.overall_status(), Severity::Nominal);
//!
//! // A gap in telemetry keeps the last known temperature
//! vehicle.update(&Frame::builder().observe(1.0).skip().build()).unwrap();
//! assert_eq!(vehicle.overall_status(), Severity::Nominal);
//! ```
//!
//! ### Sharing across threads
//!
//! ```
//! use vitals::{ConstructCatalog, EngineConfig, SharedVehicle, VehicleRepresentation};
//!
//! let config = EngineConfig::from_toml_str(
//!     r#"
//!     [[channels]]
//!     name = "time"
//!     "#,
//! )
//! .unwrap();
//! let vehicle = VehicleRepresentation::from_config(&config, &ConstructCatalog::with_builtins()).unwrap();
//! let shared = SharedVehicle::new(vehicle);
//! let reader = shared.clone();
//! std::thread::spawn(move || reader.overall_status()).join().unwrap();
//! ```

pub mod checks;
pub mod config;
pub mod construct;
pub mod error;
pub mod history;
pub mod merge;
pub mod schema;
pub mod shared;
pub mod source;
pub mod status;
pub mod suite;
pub mod vehicle;

// Re-export main types for convenience
pub use config::{ChannelConfig, EngineConfig};
pub use construct::{
    CollectedState, ConstructCatalog, ConstructContext, ConstructSpec, ReasoningArtifact,
    ReasoningConstruct, Scope, SlidingWindow,
};
pub use error::{
    CheckError, ConfigurationError, ConstructError, ConstructFailure, ShapeMismatch,
    TestEvaluationFailure,
};
pub use history::StatusHistory;
pub use merge::MergedState;
pub use schema::{ChannelSchema, TestSpec};
pub use shared::SharedVehicle;
pub use source::{ChannelSource, FileSource, FrameSource};
pub use status::{FusionWeights, OverallStatus, StatusFuser};
pub use suite::{ChannelResult, ChannelTest, SuiteResult, TestSuite};
pub use vehicle::{Diagnostics, Phase, VehicleBuilder, VehicleRepresentation};
pub use vitals_types::{ChannelStatus, Frame, FrameBuilder, Mnemonic, Reading, Severity, Value};
