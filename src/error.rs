//! Error types for the engine.
//!
//! Configuration and shape errors are fatal to the call that raised them.
//! Construct and test failures are recovered locally: they are collected per
//! cycle and surfaced through [`Diagnostics`](crate::Diagnostics), never
//! allowed to abort an update.

use std::fmt;

use thiserror::Error;

/// Errors raised while building the engine. Never recovered.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Header and test lists differ in length.
    #[error("schema mismatch: {headers} headers but {tests} tests")]
    SchemaMismatch { headers: usize, tests: usize },

    /// Two constructs report the same component name.
    #[error("duplicate reasoning construct: {0}")]
    DuplicateConstruct(String),

    /// No factory is registered for the requested construct kind.
    #[error("unknown construct kind '{kind}' for construct '{name}'")]
    UnknownConstructKind { name: String, kind: String },

    /// A factory refused its configuration.
    #[error("failed to build construct '{name}': {source}")]
    ConstructInit {
        name: String,
        #[source]
        source: ConstructError,
    },

    /// Channel test parameters are inconsistent.
    #[error("invalid test for channel '{channel}': {reason}")]
    InvalidTest { channel: String, reason: String },

    /// Fusion weights would break the confidence ordering.
    #[error("invalid fusion weights: {0}")]
    InvalidWeights(String),

    /// The configuration file could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// A frame did not match the schema width. The engine state is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame has {actual} channels, schema expects {expected}")]
pub struct ShapeMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// Error returned by a reasoning construct implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConstructError(pub String);

impl ConstructError {
    /// Create an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Error returned by a channel test implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CheckError(pub String);

impl CheckError {
    /// Create an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Which construct call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructCall {
    Update,
    RenderReasoning,
}

impl fmt::Display for ConstructCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructCall::Update => f.write_str("update"),
            ConstructCall::RenderReasoning => f.write_str("render_reasoning"),
        }
    }
}

/// A single reasoning construct failed during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("construct '{component}' failed in {call}: {message}")]
pub struct ConstructFailure {
    pub component: String,
    pub call: ConstructCall,
    pub message: String,
}

/// A single channel test failed; the channel reports no data for the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("test for channel '{channel}' failed: {message}")]
pub struct TestEvaluationFailure {
    pub channel: String,
    pub message: String,
}
