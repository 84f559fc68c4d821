//! Council lifecycle facts
//!
//! Every state transition of a council is reported as a [`CouncilFact`]
//! through the injected [`FactSink`](crate::effects::FactSink). Facts are
//! notifications for hosts (audit logs, UIs, journals). The protocol never
//! reads them back, so dropping them does not change council behaviour.
//!
//! # Example
//!
//! ```ignore
//! use warden_recovery::facts::{CouncilFact, CouncilFactEmitter};
//!
//! fn persist(fact: &CouncilFact, store: &mut impl KeyValueStore) {
//!     store.put(CouncilFactEmitter::fact_key(fact), fact.to_bytes());
//! }
//! ```

use serde::{Deserialize, Serialize};
use warden_core::{hash, Address, CouncilId};

/// Type identifier for council facts
pub const COUNCIL_FACT_TYPE_ID: &str = "council";

/// Who performed a full council reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum ResetKind {
    /// The protected-account owner
    Owner,
    /// The last honest guardian, inside its window
    LastHonest {
        /// Guardian that used the window
        guardian: Address,
    },
}

/// Council domain facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CouncilFact {
    // ========================================================================
    // Membership
    // ========================================================================
    /// Council created
    CouncilInitialized {
        council_id: CouncilId,
        members: Vec<Address>,
        threshold: usize,
        at_ms: u64,
    },

    /// Whole membership replaced and lock cleared
    CouncilReset {
        council_id: CouncilId,
        kind: ResetKind,
        members: Vec<Address>,
        threshold: usize,
        /// Nonce of the request discarded by the reset
        cleared_nonce: Option<u64>,
        at_ms: u64,
    },

    /// Guardian appended
    GuardianAdded {
        council_id: CouncilId,
        guardian: Address,
        cleared_nonce: Option<u64>,
        at_ms: u64,
    },

    /// Guardian removed
    GuardianRemoved {
        council_id: CouncilId,
        guardian: Address,
        cleared_nonce: Option<u64>,
        at_ms: u64,
    },

    /// One slot overwritten
    GuardianReplaced {
        council_id: CouncilId,
        index: usize,
        previous: Address,
        guardian: Address,
        cleared_nonce: Option<u64>,
        at_ms: u64,
    },

    /// Threshold changed
    ThresholdChanged {
        council_id: CouncilId,
        previous: usize,
        threshold: usize,
        cleared_nonce: Option<u64>,
        at_ms: u64,
    },

    // ========================================================================
    // Proposal lifecycle
    // ========================================================================
    /// Recovery request opened
    RecoveryProposed {
        council_id: CouncilId,
        proposer: Address,
        candidate: Address,
        nonce: u64,
        deadline_ms: u64,
        at_ms: u64,
    },

    /// Expired request discarded
    StaleRequestCleared {
        council_id: CouncilId,
        nonce: u64,
        at_ms: u64,
    },

    /// Approval recorded, with the running count
    RecoveryApproved {
        council_id: CouncilId,
        guardian: Address,
        nonce: u64,
        approval_count: usize,
        threshold: usize,
        at_ms: u64,
    },

    /// Approval withdrawn
    RecoveryRevoked {
        council_id: CouncilId,
        guardian: Address,
        nonce: u64,
        approval_count: usize,
        /// Whether the revocation closed a last honest window
        window_closed: bool,
        at_ms: u64,
    },

    /// Candidate released to the owner
    RecoveryExecuted {
        council_id: CouncilId,
        candidate: Address,
        nonce: u64,
        approval_count: usize,
        at_ms: u64,
    },

    // ========================================================================
    // Compromise detection
    // ========================================================================
    /// Sole holdout granted a reset window
    LastHonestWindowOpened {
        council_id: CouncilId,
        guardian: Address,
        nonce: u64,
        deadline_ms: u64,
        at_ms: u64,
    },

    /// Unanimous approval froze the council
    CouncilLocked {
        council_id: CouncilId,
        nonce: u64,
        at_ms: u64,
    },
}

impl CouncilFact {
    /// Council the fact belongs to
    pub fn council_id(&self) -> &CouncilId {
        match self {
            CouncilFact::CouncilInitialized { council_id, .. }
            | CouncilFact::CouncilReset { council_id, .. }
            | CouncilFact::GuardianAdded { council_id, .. }
            | CouncilFact::GuardianRemoved { council_id, .. }
            | CouncilFact::GuardianReplaced { council_id, .. }
            | CouncilFact::ThresholdChanged { council_id, .. }
            | CouncilFact::RecoveryProposed { council_id, .. }
            | CouncilFact::StaleRequestCleared { council_id, .. }
            | CouncilFact::RecoveryApproved { council_id, .. }
            | CouncilFact::RecoveryRevoked { council_id, .. }
            | CouncilFact::RecoveryExecuted { council_id, .. }
            | CouncilFact::LastHonestWindowOpened { council_id, .. }
            | CouncilFact::CouncilLocked { council_id, .. } => council_id,
        }
    }

    /// When the transition happened (ms since epoch)
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            CouncilFact::CouncilInitialized { at_ms, .. }
            | CouncilFact::CouncilReset { at_ms, .. }
            | CouncilFact::GuardianAdded { at_ms, .. }
            | CouncilFact::GuardianRemoved { at_ms, .. }
            | CouncilFact::GuardianReplaced { at_ms, .. }
            | CouncilFact::ThresholdChanged { at_ms, .. }
            | CouncilFact::RecoveryProposed { at_ms, .. }
            | CouncilFact::StaleRequestCleared { at_ms, .. }
            | CouncilFact::RecoveryApproved { at_ms, .. }
            | CouncilFact::RecoveryRevoked { at_ms, .. }
            | CouncilFact::RecoveryExecuted { at_ms, .. }
            | CouncilFact::LastHonestWindowOpened { at_ms, .. }
            | CouncilFact::CouncilLocked { at_ms, .. } => *at_ms,
        }
    }

    /// Get the sub-type string for this fact variant
    pub fn sub_type(&self) -> &'static str {
        match self {
            CouncilFact::CouncilInitialized { .. } => "council-initialized",
            CouncilFact::CouncilReset { .. } => "council-reset",
            CouncilFact::GuardianAdded { .. } => "guardian-added",
            CouncilFact::GuardianRemoved { .. } => "guardian-removed",
            CouncilFact::GuardianReplaced { .. } => "guardian-replaced",
            CouncilFact::ThresholdChanged { .. } => "threshold-changed",
            CouncilFact::RecoveryProposed { .. } => "recovery-proposed",
            CouncilFact::StaleRequestCleared { .. } => "stale-request-cleared",
            CouncilFact::RecoveryApproved { .. } => "recovery-approved",
            CouncilFact::RecoveryRevoked { .. } => "recovery-revoked",
            CouncilFact::RecoveryExecuted { .. } => "recovery-executed",
            CouncilFact::LastHonestWindowOpened { .. } => "last-honest-window-opened",
            CouncilFact::CouncilLocked { .. } => "council-locked",
        }
    }

    /// JSON encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Decode from [`CouncilFact::to_bytes`] output
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}

/// Key and encoding helpers for hosts that store facts.
pub struct CouncilFactEmitter;

impl CouncilFactEmitter {
    /// Content-addressed key: `council:{sub_type}:{council_id}:{hash prefix}`.
    pub fn fact_key(fact: &CouncilFact) -> String {
        let digest = hash::hash(&fact.to_bytes());
        format!(
            "{}:{}:{}:{}",
            COUNCIL_FACT_TYPE_ID,
            fact.sub_type(),
            fact.council_id(),
            hash::short_hex(&digest)
        )
    }
}
