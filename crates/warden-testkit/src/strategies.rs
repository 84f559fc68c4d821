//! Property test strategies for Warden types
//!
//! Identities come from small seed ranges so that generated operations hit
//! real guardians, outsiders and repeated callers often.

use crate::fixtures::{candidate, guardian, outsider};
use proptest::prelude::*;
use warden_core::Address;

// Re-export proptest for convenience
pub use proptest;

/// Council dimensions `(size, threshold)` with `1 <= threshold <= size <= max`
pub fn arb_council_params(max_size: u64) -> impl Strategy<Value = (u64, usize)> {
    (1..=max_size).prop_flat_map(|size| (Just(size), 1..=size as usize))
}

/// One of the first `size` guardians, or occasionally an outsider
pub fn arb_caller(size: u64) -> impl Strategy<Value = Address> {
    prop_oneof![
        8 => (1..=size).prop_map(guardian),
        1 => (1u64..=3).prop_map(outsider),
    ]
}

/// Candidate account, occasionally the null address
pub fn arb_candidate() -> impl Strategy<Value = Address> {
    prop_oneof![
        9 => (1u64..=4).prop_map(candidate),
        1 => Just(Address::ZERO),
    ]
}

/// Operations a random council history is built from
#[derive(Debug, Clone)]
pub enum CouncilOp {
    Propose { proposer: Address, candidate: Address },
    Approve { guardian: Address },
    Revoke { guardian: Address },
    Execute,
    LastHonestReset { caller: Address, size: u64, threshold: usize },
    OwnerReset { size: u64, threshold: usize },
    AddGuardian { guardian: Address },
    RemoveGuardian { guardian: Address },
    SetThreshold { threshold: usize },
    ClearExpired,
    AdvanceMs { ms: u64 },
}

/// Random operation against a council that started with `size` guardians
pub fn arb_council_op(size: u64) -> impl Strategy<Value = CouncilOp> {
    let pool = size + 2;
    prop_oneof![
        3 => (arb_caller(size), arb_candidate())
            .prop_map(|(proposer, candidate)| CouncilOp::Propose { proposer, candidate }),
        8 => arb_caller(size).prop_map(|guardian| CouncilOp::Approve { guardian }),
        2 => arb_caller(size).prop_map(|guardian| CouncilOp::Revoke { guardian }),
        2 => Just(CouncilOp::Execute),
        1 => (arb_caller(pool), arb_council_params(pool))
            .prop_map(|(caller, (size, threshold))| CouncilOp::LastHonestReset { caller, size, threshold }),
        1 => arb_council_params(pool)
            .prop_map(|(size, threshold)| CouncilOp::OwnerReset { size, threshold }),
        1 => (1..=pool).prop_map(|seed| CouncilOp::AddGuardian { guardian: guardian(seed) }),
        1 => (1..=pool).prop_map(|seed| CouncilOp::RemoveGuardian { guardian: guardian(seed) }),
        1 => (0..=pool as usize + 1).prop_map(|threshold| CouncilOp::SetThreshold { threshold }),
        1 => Just(CouncilOp::ClearExpired),
        2 => (0u64..200_000_000).prop_map(|ms| CouncilOp::AdvanceMs { ms }),
    ]
}
