//! # vitals-types
//!
//! Core types for vehicle telemetry health monitoring. This crate defines the
//! data model shared by the `vitals` engine, its channel checks and any
//! reasoning construct plugged into it.
//!
//! ## Design Goals
//!
//! - **No sentinel values**: an absent channel is [`Reading::Unobserved`], never a
//!   magic literal that could collide with real telemetry
//! - **Optional serialization**: enable the `serde` feature to read and write
//!   frames as JSON arrays (`null` marks an unobserved channel)
//! - **Ordered severities**: [`Severity`] sorts so that the worst verdict wins a
//!   plain `max()`
//!
//! ## Example
//!
//! ```rust
//! use vitals_types::{Frame, Reading, Severity, ChannelStatus};
//!
//! // Timestamp and voltage arrive, the current channel does not
//! let frame = Frame::builder()
//!     .observe(12.0)
//!     .observe(5.1)
//!     .skip()
//!     .build();
//!
//! assert_eq!(frame.len(), 3);
//! assert_eq!(frame.get(2), Some(&Reading::Unobserved));
//!
//! let status = ChannelStatus::warning("BATT_UNDERVOLT");
//! assert!(status.severity > Severity::NoData);
//! ```

mod frame;
mod status;
mod value;

pub use frame::*;
pub use status::*;
pub use value::*;
