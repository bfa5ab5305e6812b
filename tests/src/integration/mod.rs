//! # Integration Flows
//!
//! Each module wires real subsystem crates together; only the reporting
//! plugin and the transmitter are test doubles.

#[cfg(test)]
mod fixtures;

pub mod committee_flows;
pub mod config_epochs;
