//! Warden Core - Foundation types for guardian council recovery
//!
//! This crate provides the shared vocabulary used by every other Warden crate.
//! It contains no protocol logic.
//!
//! ## What Belongs Here
//!
//! - Opaque identities (`Address`) and council keys (`CouncilId`)
//! - The unified `WardenError` for infrastructure failures
//! - Physical time types and the `PhysicalTimeEffects` clock interface
//! - Clock handlers (system clock, simulated clock)
//! - Configuration types, loading and validation
//! - Content hashing for fact keys and fingerprints
//!
//! ## What Does NOT Belong Here
//!
//! - Council state machines (belong in warden-recovery)
//! - Test fixtures and strategies (belong in warden-testkit)

#![allow(missing_docs)]
#![forbid(unsafe_code)]

/// Configuration types, loading and validation
pub mod config;

/// Unified error handling
pub mod errors;

/// Clock handler implementations
pub mod handlers;

/// Content hashing
pub mod hash;

/// Identity and council identifiers
pub mod identifiers;

/// Physical time and the clock effect interface
pub mod time;

pub use config::{CouncilConfig, RecoveryConfig, WardenConfig};
pub use errors::{Result, WardenError};
pub use handlers::{SimulatedTimeHandler, SystemTimeHandler};
pub use identifiers::{Address, CouncilId};
pub use time::{PhysicalTime, PhysicalTimeEffects, TimeError};
