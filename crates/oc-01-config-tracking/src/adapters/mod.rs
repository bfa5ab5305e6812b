//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound config source port.

mod in_memory;

pub use in_memory::InMemoryConfigTracker;
