//! Ports for the health reporter

pub mod inbound;
