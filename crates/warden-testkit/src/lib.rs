//! Warden Testing Infrastructure
//!
//! Deterministic clocks, recording fact sinks, identity fixtures and proptest
//! strategies shared by the Warden crates' tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! warden-testkit = { path = "../warden-testkit" }
//! ```
//!
//! ```rust,no_run
//! use warden_testkit::*;
//!
//! let mut council = CouncilHarness::new(7, 5);
//! let g1 = council.g(1);
//! council.propose(g1, candidate(1)).unwrap();
//! ```

pub mod fixtures;
pub mod sink;
pub mod strategies;
pub mod time;

pub use fixtures::{
    candidate, guardian, guardians, outsider, test_effects, CouncilHarness, TestEffects,
};
pub use sink::RecordingFactSink;
pub use time::ControllableClock;
