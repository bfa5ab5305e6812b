//! Ports for the Round Executor
//!
//! - inbound: round execution API
//! - outbound: reporting plugin, contract transmitter, digest guard

pub mod inbound;
pub mod outbound;
