//! Protocol error type
//!
//! Every rejection is all-or-nothing: a call that returns `Err` has not
//! touched council state.

use serde::{Deserialize, Serialize};
use warden_core::{Address, CouncilId, TimeError, WardenError};

/// Broad class of a protocol rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Caller lacks standing
    Authorization,
    /// Operation invalid in the current state
    StateConflict,
    /// Time-bounded action arrived late
    Temporal,
    /// Malformed input
    Validation,
    /// Not enough approvals yet
    Quorum,
    /// Clock or registry plumbing failed
    Infrastructure,
}

/// Errors returned by council operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouncilError {
    #[error("{caller} is not authorized for this operation")]
    Unauthorized { caller: Address },

    #[error("{guardian} is not a guardian of this council")]
    NotGuardian { guardian: Address },

    #[error("{caller} does not hold the last honest guardian window")]
    NotLastHonest { caller: Address },

    #[error("a recovery request is already active (nonce {nonce})")]
    ActiveProposalExists { nonce: u64 },

    #[error("no active recovery request")]
    NoActiveProposal,

    #[error("{guardian} already approved request {nonce}")]
    AlreadyApproved { guardian: Address, nonce: u64 },

    #[error("council is locked pending an owner reset")]
    Locked,

    #[error("{guardian} has no approval to revoke")]
    NothingToDo { guardian: Address },

    #[error("last honest reset not allowed: {reason}")]
    NotAllowed { reason: String },

    #[error("recovery request expired at {deadline_ms}ms (now {now_ms}ms)")]
    ProposalExpired { deadline_ms: u64, now_ms: u64 },

    #[error("last honest window closed at {deadline_ms}ms (now {now_ms}ms)")]
    WindowExpired { deadline_ms: u64, now_ms: u64 },

    #[error("invalid parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("duplicate guardian {guardian}")]
    DuplicateGuardian { guardian: Address },

    #[error("zero address is not allowed")]
    ZeroAddress,

    #[error("guardian index {index} out of range for council of {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("threshold not met: {approvals} of {threshold} approvals")]
    ThresholdNotMet { approvals: usize, threshold: usize },

    #[error("council '{council}' not found")]
    CouncilNotFound { council: CouncilId },

    #[error("council '{council}' already exists")]
    CouncilExists { council: CouncilId },

    #[error("clock error: {0}")]
    Clock(#[from] TimeError),
}

impl CouncilError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_allowed(reason: impl Into<String>) -> Self {
        Self::NotAllowed {
            reason: reason.into(),
        }
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            CouncilError::Unauthorized { .. }
            | CouncilError::NotGuardian { .. }
            | CouncilError::NotLastHonest { .. } => ErrorCategory::Authorization,
            CouncilError::ActiveProposalExists { .. }
            | CouncilError::NoActiveProposal
            | CouncilError::AlreadyApproved { .. }
            | CouncilError::Locked
            | CouncilError::NothingToDo { .. }
            | CouncilError::NotAllowed { .. }
            | CouncilError::CouncilExists { .. } => ErrorCategory::StateConflict,
            CouncilError::ProposalExpired { .. } | CouncilError::WindowExpired { .. } => {
                ErrorCategory::Temporal
            }
            CouncilError::InvalidParams { .. }
            | CouncilError::DuplicateGuardian { .. }
            | CouncilError::ZeroAddress
            | CouncilError::IndexOutOfRange { .. } => ErrorCategory::Validation,
            CouncilError::ThresholdNotMet { .. } => ErrorCategory::Quorum,
            CouncilError::CouncilNotFound { .. } | CouncilError::Clock(_) => {
                ErrorCategory::Infrastructure
            }
        }
    }

    /// Whether repeating the same call later can succeed without any reset.
    ///
    /// Only a quorum shortfall qualifies: more approvals may arrive.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CouncilError::ThresholdNotMet { .. })
    }
}

impl From<CouncilError> for WardenError {
    fn from(err: CouncilError) -> Self {
        let message = err.to_string();
        match err.category() {
            ErrorCategory::Authorization => WardenError::permission_denied(message),
            ErrorCategory::Validation => WardenError::invalid(message),
            ErrorCategory::Infrastructure => match err {
                CouncilError::CouncilNotFound { .. } => WardenError::not_found(message),
                _ => WardenError::internal(message),
            },
            ErrorCategory::StateConflict | ErrorCategory::Temporal | ErrorCategory::Quorum => {
                WardenError::invalid(message)
            }
        }
    }
}

/// Result alias for council operations
pub type CouncilResult<T> = std::result::Result<T, CouncilError>;
