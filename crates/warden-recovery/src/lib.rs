//! # Warden Recovery - guardian council protocol
//!
//! N-of-M guardian councils protecting privileged addresses from key loss or
//! coercion.
//!
//! ## What Belongs Here
//!
//! - Council data model and the registry holding every council
//! - Membership management (init, owner reset, incremental changes)
//! - The propose / approve / revoke / execute state machine
//! - Compromise detection: the last honest window and the unanimity lock
//! - Lifecycle facts and the effect traits that carry them out
//! - The protected-account owner that applies executed recoveries
//!
//! ## What Does NOT Belong Here
//!
//! - Clock implementations and configuration loading (belong in warden-core)
//! - Test fixtures (belong in warden-testkit)
//! - Persistence of the registry; every state type is serde-serializable and
//!   hosts choose the layout
//!
//! ## Concurrency
//!
//! Every mutating call takes `&mut CouncilRegistry`, so calls against a
//! registry are serialized by the borrow checker. Nothing blocks or spawns
//! background work; expiry is evaluated lazily against the injected clock.

#![allow(missing_docs)]
#![forbid(unsafe_code)]

/// Compromise detection heuristics
mod compromise;

/// Stateless coordinator infrastructure
pub mod coordinator;

/// Effect composition for council operations
pub mod effects;

/// Protocol error type
pub mod errors;

/// Council lifecycle facts
pub mod facts;

/// Guardian membership management
pub mod guardian_membership;

/// Protected-account owner and recovery hand-off
pub mod owner;

/// Proposal lifecycle coordinator
pub mod recovery_protocol;

/// Council registry
pub mod registry;

/// Derived status and snapshots
pub mod state;

/// Council data model
pub mod types;

pub use coordinator::{BaseCoordinator, BaseCoordinatorAccess};
pub use effects::{FactLog, FactSink, NullSink, RecoveryEffectSystem, RecoveryEffects};
pub use errors::{CouncilError, CouncilResult, ErrorCategory};
pub use facts::{CouncilFact, CouncilFactEmitter, ResetKind, COUNCIL_FACT_TYPE_ID};
pub use guardian_membership::GuardianMembershipManager;
pub use owner::{AccountRotation, NoopHandoff, ProtectedAccountOwner, RecoveryHandoff};
pub use recovery_protocol::{Capability, RecoveryCoordinator};
pub use registry::CouncilRegistry;
pub use state::{CouncilView, RecoveryStatus};
pub use types::{Council, CouncilState, GuardianSet, LastHonestState, RecoveryRequest};
