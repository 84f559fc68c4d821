//! Compromise detection
//!
//! Approval counts near unanimity are treated as evidence about the council
//! itself:
//!
//! - at `size - 1` approvals the single holdout may be the only guardian not
//!   under attacker control, so it gets a time-boxed right to replace the
//!   whole council (the last honest window);
//! - at `size` approvals the request is indistinguishable from total
//!   compromise, so the council locks instead of executing.
//!
//! These functions only inspect and update a [`CouncilState`]. Fact emission
//! is left to the recovery coordinator.

use crate::errors::{CouncilError, CouncilResult};
use crate::types::{CouncilState, LastHonestState};
use warden_core::{Address, PhysicalTime};

/// What an approval did to the council beyond counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApprovalOutcome {
    /// No threshold crossed
    Counted,
    /// `size - 1` reached; window opened for the holdout
    WindowOpened(LastHonestState),
    /// Unanimity reached; council locked
    Locked,
}

/// Apply the detector after an approval has been recorded.
pub(crate) fn after_approval(
    state: &mut CouncilState,
    now: PhysicalTime,
    window_ms: u64,
) -> ApprovalOutcome {
    let Some(request) = state.request.as_ref() else {
        return ApprovalOutcome::Counted;
    };
    let size = state.council.size();
    let approvals = request.approval_count();

    if approvals >= size {
        state.council.locked = true;
        state.last_honest = None;
        tracing::warn!(
            council = %state.id,
            approvals,
            nonce = request.nonce,
            "unanimous approval: council locked pending owner reset"
        );
        return ApprovalOutcome::Locked;
    }

    if size >= 2 && approvals == size - 1 {
        let Some(holdout) = sole_non_approver(state) else {
            return ApprovalOutcome::Counted;
        };
        let window = LastHonestState {
            guardian: holdout,
            opened_at: now,
            deadline: now.deadline_after(window_ms),
            nonce: request.nonce,
        };
        tracing::warn!(
            council = %state.id,
            guardian = %holdout,
            approvals,
            nonce = request.nonce,
            deadline_ms = window.deadline.ts_ms,
            "last honest window opened"
        );
        state.last_honest = Some(window);
        return ApprovalOutcome::WindowOpened(window);
    }

    ApprovalOutcome::Counted
}

/// Apply the detector after a revocation. Returns whether a window closed.
pub(crate) fn after_revocation(state: &mut CouncilState) -> bool {
    let size = state.council.size();
    if state.approval_count() + 1 < size && state.last_honest.is_some() {
        state.last_honest = None;
        tracing::info!(council = %state.id, "last honest window closed by revocation");
        return true;
    }
    false
}

/// Preconditions of a last honest reset, excluding the new membership.
pub(crate) fn check_last_honest_reset(
    state: &CouncilState,
    caller: &Address,
    now: PhysicalTime,
) -> CouncilResult<()> {
    let window = match state.last_honest {
        Some(window) if window.guardian == *caller => window,
        _ => return Err(CouncilError::NotLastHonest { caller: *caller }),
    };
    if now.is_past(window.deadline) {
        return Err(CouncilError::WindowExpired {
            deadline_ms: window.deadline.ts_ms,
            now_ms: now.ts_ms,
        });
    }
    if state.request.is_none() {
        return Err(CouncilError::not_allowed("no recovery request is active"));
    }
    let size = state.council.size();
    let approvals = state.approval_count();
    if approvals + 1 != size {
        return Err(CouncilError::not_allowed(format!(
            "{approvals} of {size} guardians approve; window requires exactly {}",
            size - 1
        )));
    }
    Ok(())
}

/// The last honest window, if it is still usable at `now`.
pub(crate) fn open_window(state: &CouncilState, now: PhysicalTime) -> Option<&LastHonestState> {
    state
        .last_honest
        .as_ref()
        .filter(|window| !now.is_past(window.deadline))
}

fn sole_non_approver(state: &CouncilState) -> Option<Address> {
    let request = state.request.as_ref()?;
    let mut holdouts = state
        .council
        .members
        .iter()
        .filter(|guardian| !request.has_approved(guardian));
    let holdout = *holdouts.next()?;
    holdouts.next().is_none().then_some(holdout)
}
