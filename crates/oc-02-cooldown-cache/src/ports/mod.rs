//! Ports for the cooldown cache

pub mod inbound;
