//! # Shared Types Crate
//!
//! This crate contains the committee data model and the opaque payloads that
//! flow through a reporting round.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Opaque Payloads**: `Query`, `Observation`, `Outcome` and reports are
//!   plain bytes at this layer; their schema belongs to the reporting plugin.
//! - **Authoritative Identity**: `AttributedObservation::observer` is assigned
//!   by the collecting node, never parsed out of the payload.

pub mod digest;
pub mod entities;
pub mod errors;

pub use digest::*;
pub use entities::*;
pub use errors::*;
