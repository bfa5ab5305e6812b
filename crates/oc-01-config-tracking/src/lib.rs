//! # oc-01-config-tracking
//!
//! Config epoch tracking for the oracle committee.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Config digests**: a deterministic 32-byte identifier per committee
//!   configuration, with an optional per-instance transform
//! - **Prefix invariance**: the 2-byte protocol-family prefix survives every
//!   transform, so message routing never breaks
//! - **Config tracking**: a wrapper over the authoritative config source that
//!   applies the same transform to every digest it returns
//!
//! ## Architecture
//!
//! ```text
//! Config contract ──(base tracker)──→ DigestTransformingTracker ──→ Round driver
//!                                           │
//!                                           └── DigestTransform (per instance)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use oc_01_config_tracking::{DigestTransformingTracker, DiscriminatorTransform};
//!
//! let tracker = DigestTransformingTracker::new(
//!     base_tracker,
//!     DiscriminatorTransform::new(b"commit-plugin".to_vec()),
//! );
//! let details = tracker.latest_config_details(&cancel).await?;
//! let config = tracker.latest_config(&cancel, details.changed_in_block).await?;
//! assert_eq!(details.config_digest, config.config_digest);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemoryConfigTracker;
pub use domain::{
    DigestTransform, DiscriminatorTransform, IdentityTransform, Keccak256ConfigDigester,
    TransformingConfigDigester,
};
pub use error::{ConfigTrackingError, ConfigTrackingResult};
pub use ports::inbound::ConfigDigester;
pub use ports::outbound::{ConfigDetails, ContractConfigTracker};
pub use service::DigestTransformingTracker;
