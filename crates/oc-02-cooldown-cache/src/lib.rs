//! # oc-02-cooldown-cache
//!
//! Suppresses repeated work on the same cross-round artifact (a merkle root, a
//! report fingerprint) until its cool-down elapses.
//!
//! ## Contract
//!
//! - `get(key)` returns `None` for keys never set, otherwise the last value
//!   written to that key
//! - `set(key, until)` overwrites, last write wins
//! - Reads share a read lock and never block each other
//! - No automatic eviction; callers bound cardinality and may call
//!   `prune_expired`
//!
//! ## Example
//!
//! ```rust,ignore
//! use oc_02_cooldown_cache::CooldownCache;
//! use chrono::{Duration, Utc};
//!
//! let cache: CooldownCache = CooldownCache::new();
//! cache.cool_down_for(merkle_root, Duration::minutes(5));
//! if cache.is_cooling_down(&merkle_root, Utc::now()) {
//!     return; // committed recently, skip
//! }
//! ```

pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use error::{CacheError, CacheResult};
pub use ports::inbound::CooldownApi;
pub use service::CooldownCache;
