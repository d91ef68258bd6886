//! Domain layer - Core provisioning types and port definitions
//!
//! This module defines the request/outcome types and the resource store
//! port that platform adapters implement.

pub mod ports;

pub use ports::*;
