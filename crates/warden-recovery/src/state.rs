//! Derived council status
//!
//! The stored state is the [`CouncilState`] record. The lifecycle position a
//! host sees is computed from that record and the current time, so expiry
//! needs no background work.

use crate::types::{CouncilState, LastHonestState, RecoveryRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use warden_core::{Address, CouncilId, PhysicalTime};

/// Lifecycle position of a council at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecoveryStatus {
    /// No active request
    Idle,
    /// Request open, nobody has approved yet
    Proposed { nonce: u64, deadline_ms: u64 },
    /// Some approvals, threshold not reached
    Approving {
        nonce: u64,
        approvals: usize,
        threshold: usize,
    },
    /// Threshold reached; `execute` would succeed
    Executable { nonce: u64, approvals: usize },
    /// The holdout guardian may reset the council
    LastHonestWindowOpen {
        guardian: Address,
        deadline_ms: u64,
        /// Whether `execute` would also succeed right now
        executable: bool,
    },
    /// Frozen until an owner reset
    Locked,
    /// Request outlived its deadline and awaits clearing or a new proposal
    Expired { nonce: u64, deadline_ms: u64 },
}

impl RecoveryStatus {
    /// Derive the status of `state` at `now`.
    ///
    /// Precedence: locked, open window, expired, executable, approving,
    /// proposed, idle.
    pub fn derive(state: &CouncilState, now: PhysicalTime) -> Self {
        if state.council.locked {
            return RecoveryStatus::Locked;
        }
        let Some(request) = state.request.as_ref() else {
            return RecoveryStatus::Idle;
        };
        let expired = request.is_expired_at(now);
        let approvals = request.approval_count();
        let threshold = state.council.threshold;
        let executable = !expired && approvals >= threshold;

        if let Some(window) = state.last_honest.as_ref() {
            if !now.is_past(window.deadline) {
                return RecoveryStatus::LastHonestWindowOpen {
                    guardian: window.guardian,
                    deadline_ms: window.deadline.ts_ms,
                    executable,
                };
            }
        }
        if expired {
            return RecoveryStatus::Expired {
                nonce: request.nonce,
                deadline_ms: request.deadline.ts_ms,
            };
        }
        if executable {
            return RecoveryStatus::Executable {
                nonce: request.nonce,
                approvals,
            };
        }
        if approvals > 0 {
            return RecoveryStatus::Approving {
                nonce: request.nonce,
                approvals,
                threshold,
            };
        }
        RecoveryStatus::Proposed {
            nonce: request.nonce,
            deadline_ms: request.deadline.ts_ms,
        }
    }

    /// Short lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            RecoveryStatus::Idle => "idle",
            RecoveryStatus::Proposed { .. } => "proposed",
            RecoveryStatus::Approving { .. } => "approving",
            RecoveryStatus::Executable { .. } => "executable",
            RecoveryStatus::LastHonestWindowOpen { .. } => "last_honest_window_open",
            RecoveryStatus::Locked => "locked",
            RecoveryStatus::Expired { .. } => "expired",
        }
    }
}

impl fmt::Display for RecoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializable read-only snapshot of one council.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilView {
    pub id: CouncilId,
    pub members: Vec<Address>,
    pub threshold: usize,
    pub locked: bool,
    pub nonce: u64,
    pub active_request: Option<RecoveryRequest>,
    pub last_honest: Option<LastHonestState>,
    pub status: RecoveryStatus,
    /// Instant the snapshot was taken (ms)
    pub observed_at_ms: u64,
}

impl CouncilView {
    pub fn capture(state: &CouncilState, now: PhysicalTime) -> Self {
        Self {
            id: state.id.clone(),
            members: state.council.members.as_slice().to_vec(),
            threshold: state.council.threshold,
            locked: state.council.locked,
            nonce: state.nonce,
            active_request: state.request.clone(),
            last_honest: state.last_honest,
            status: RecoveryStatus::derive(state, now),
            observed_at_ms: now.ts_ms,
        }
    }
}
