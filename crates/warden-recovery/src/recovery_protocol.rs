//! Recovery proposal lifecycle
//!
//! Drives one council through
//! `Idle -> Proposed -> Approving -> Executable -> Executed`, with the side
//! states `LastHonestWindowOpen` and `Locked` managed by the
//! [compromise detector](crate::compromise).
//!
//! Every operation runs all of its precondition checks against the borrowed
//! [`CouncilState`] before touching it, so a rejected call leaves the council
//! exactly as it was. The same checks back [`RecoveryCoordinator::check_capability`].
//!
//! # Example
//!
//! ```ignore
//! let nonce = recovery.propose(&mut registry, &id, g1, candidate)?;
//! for guardian in &approvers {
//!     recovery.approve(&mut registry, &id, *guardian)?;
//! }
//! let new_account = recovery.execute(&mut registry, &id)?;
//! ```

use crate::compromise::{self, ApprovalOutcome};
use crate::coordinator::{BaseCoordinator, BaseCoordinatorAccess};
use crate::effects::RecoveryEffects;
use crate::errors::{CouncilError, CouncilResult};
use crate::facts::{CouncilFact, ResetKind};
use crate::guardian_membership::GuardianMembershipManager;
use crate::registry::CouncilRegistry;
use crate::state::{CouncilView, RecoveryStatus};
use crate::types::{Council, CouncilState, LastHonestState, RecoveryRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use warden_core::hash;
use warden_core::{Address, CouncilId, PhysicalTime, RecoveryConfig};

/// Protocol actions a caller may ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Propose,
    Approve,
    Revoke,
    Execute,
    LastHonestReset,
}

/// Proposal lifecycle coordinator.
pub struct RecoveryCoordinator<E: RecoveryEffects> {
    base: BaseCoordinator<E>,
    membership: GuardianMembershipManager<E>,
}

impl<E: RecoveryEffects> BaseCoordinatorAccess<E> for RecoveryCoordinator<E> {
    fn base(&self) -> &BaseCoordinator<E> {
        &self.base
    }
}

impl<E: RecoveryEffects> RecoveryCoordinator<E> {
    pub fn new(effect_system: Arc<E>, config: RecoveryConfig) -> Self {
        let base = BaseCoordinator::new(effect_system, config);
        Self {
            membership: GuardianMembershipManager::from_base(base.clone()),
            base,
        }
    }

    /// Open a recovery request for `candidate`. Returns the request nonce.
    ///
    /// An expired request left behind is discarded first and reported as
    /// `StaleRequestCleared`, unless it still backs an open last honest
    /// window, which fails `NotAllowed` until the window closes.
    ///
    /// A locked council fails `Locked` before the proposer is checked.
    pub fn propose(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
        proposer: Address,
        candidate: Address,
    ) -> CouncilResult<u64> {
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        check_propose(state, &proposer, now)
            .and_then(|()| {
                if candidate.is_zero() {
                    Err(CouncilError::invalid("candidate must not be the zero address"))
                } else {
                    Ok(())
                }
            })
            .map_err(|err| rejected(id, "propose", err))?;

        if let Some(stale) = state.clear_in_flight() {
            self.emit_stale(id, stale, now);
        }

        state.nonce = state.nonce.saturating_add(1);
        let nonce = state.nonce;
        let deadline = now.deadline_after(self.base.config().proposal_ttl_ms);
        let request = RecoveryRequest {
            proposed_account: candidate,
            proposer,
            created_at: now,
            deadline,
            approvals: BTreeSet::new(),
            nonce,
        };
        let fingerprint = hash::short_hex(&request.fingerprint(id));
        state.request = Some(request);

        tracing::info!(
            council = %id,
            guardian = %proposer,
            candidate = %candidate,
            nonce,
            deadline_ms = deadline.ts_ms,
            request = %fingerprint,
            "recovery proposed"
        );
        self.base.emit(CouncilFact::RecoveryProposed {
            council_id: id.clone(),
            proposer,
            candidate,
            nonce,
            deadline_ms: deadline.ts_ms,
            at_ms: now.ts_ms,
        });
        Ok(nonce)
    }

    /// Record `guardian`'s approval. Returns the new approval count.
    pub fn approve(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
        guardian: Address,
    ) -> CouncilResult<usize> {
        let now = self.base.now()?;
        let window_ms = self.base.config().last_honest_window_ms;
        let state = registry.get_mut(id)?;
        check_approve(state, &guardian, now).map_err(|err| rejected(id, "approve", err))?;

        let Some(request) = state.request.as_mut() else {
            return Err(CouncilError::NoActiveProposal);
        };
        request.approvals.insert(guardian);
        let approvals = request.approval_count();
        let nonce = request.nonce;
        let threshold = state.council.threshold;

        tracing::info!(council = %id, guardian = %guardian, approvals, nonce, "recovery approved");
        self.base.emit(CouncilFact::RecoveryApproved {
            council_id: id.clone(),
            guardian,
            nonce,
            approval_count: approvals,
            threshold,
            at_ms: now.ts_ms,
        });

        match compromise::after_approval(state, now, window_ms) {
            ApprovalOutcome::Counted => {}
            ApprovalOutcome::WindowOpened(window) => {
                self.base.emit(CouncilFact::LastHonestWindowOpened {
                    council_id: id.clone(),
                    guardian: window.guardian,
                    nonce,
                    deadline_ms: window.deadline.ts_ms,
                    at_ms: now.ts_ms,
                });
            }
            ApprovalOutcome::Locked => {
                self.base.emit(CouncilFact::CouncilLocked {
                    council_id: id.clone(),
                    nonce,
                    at_ms: now.ts_ms,
                });
            }
        }
        Ok(approvals)
    }

    /// Withdraw `guardian`'s approval. Returns the new approval count.
    pub fn revoke(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
        guardian: Address,
    ) -> CouncilResult<usize> {
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        check_revoke(state, &guardian, now).map_err(|err| rejected(id, "revoke", err))?;

        let Some(request) = state.request.as_mut() else {
            return Err(CouncilError::NoActiveProposal);
        };
        request.approvals.remove(&guardian);
        let approvals = request.approval_count();
        let nonce = request.nonce;
        let window_closed = compromise::after_revocation(state);

        tracing::info!(council = %id, guardian = %guardian, approvals, nonce, "approval revoked");
        self.base.emit(CouncilFact::RecoveryRevoked {
            council_id: id.clone(),
            guardian,
            nonce,
            approval_count: approvals,
            window_closed,
            at_ms: now.ts_ms,
        });
        Ok(approvals)
    }

    /// Consume an approved request and return its candidate address.
    ///
    /// Succeeds once per request; a second call fails `NoActiveProposal`.
    pub fn execute(&self, registry: &mut CouncilRegistry, id: &CouncilId) -> CouncilResult<Address> {
        self.execute_request(registry, id)
            .map(|request| request.proposed_account)
    }

    /// [`execute`](Self::execute), returning the whole consumed request.
    pub fn execute_request(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
    ) -> CouncilResult<RecoveryRequest> {
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        check_execute(state, now).map_err(|err| rejected(id, "execute", err))?;

        state.last_honest = None;
        let Some(request) = state.request.take() else {
            return Err(CouncilError::NoActiveProposal);
        };

        tracing::info!(
            council = %id,
            candidate = %request.proposed_account,
            approvals = request.approval_count(),
            nonce = request.nonce,
            "recovery executed"
        );
        self.base.emit(CouncilFact::RecoveryExecuted {
            council_id: id.clone(),
            candidate: request.proposed_account,
            nonce: request.nonce,
            approval_count: request.approval_count(),
            at_ms: now.ts_ms,
        });
        Ok(request)
    }

    /// Replace the council from inside an open last honest window.
    pub fn last_honest_reset(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
        caller: Address,
        members: Vec<Address>,
        threshold: usize,
    ) -> CouncilResult<()> {
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        compromise::check_last_honest_reset(state, &caller, now)
            .map_err(|err| rejected(id, "last_honest_reset", err))?;
        let council = self.membership.build_council(members, threshold)?;

        self.membership.reset_council(
            state,
            council,
            ResetKind::LastHonest { guardian: caller },
            now,
        );
        Ok(())
    }

    /// Discard an expired request. Returns whether anything was cleared.
    ///
    /// A request backing an open last honest window is kept until the window
    /// closes.
    pub fn clear_expired(&self, registry: &mut CouncilRegistry, id: &CouncilId) -> CouncilResult<bool> {
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        if state.council.locked {
            return Err(rejected(id, "clear_expired", CouncilError::Locked));
        }
        let expired = state
            .request
            .as_ref()
            .is_some_and(|request| request.is_expired_at(now));
        if !expired || compromise::open_window(state, now).is_some() {
            return Ok(false);
        }
        if let Some(nonce) = state.clear_in_flight() {
            self.emit_stale(id, nonce, now);
        }
        Ok(true)
    }

    /// Report whether `caller` could perform `capability` right now.
    ///
    /// Returns the error the real call would fail with, without mutating.
    /// `Propose` does not know the candidate, so the zero-candidate check is
    /// skipped, as are the new-membership checks of `LastHonestReset`.
    pub fn check_capability(
        &self,
        registry: &CouncilRegistry,
        id: &CouncilId,
        caller: Address,
        capability: Capability,
    ) -> CouncilResult<()> {
        let now = self.base.now()?;
        let state = registry.get(id)?;
        match capability {
            Capability::Propose => check_propose(state, &caller, now),
            Capability::Approve => check_approve(state, &caller, now),
            Capability::Revoke => check_revoke(state, &caller, now),
            Capability::Execute => check_execute(state, now),
            Capability::LastHonestReset => compromise::check_last_honest_reset(state, &caller, now),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_guardian(
        &self,
        registry: &CouncilRegistry,
        id: &CouncilId,
        guardian: &Address,
    ) -> CouncilResult<bool> {
        Ok(registry.get(id)?.is_guardian(guardian))
    }

    pub fn council<'r>(&self, registry: &'r CouncilRegistry, id: &CouncilId) -> CouncilResult<&'r Council> {
        Ok(&registry.get(id)?.council)
    }

    pub fn active_request<'r>(
        &self,
        registry: &'r CouncilRegistry,
        id: &CouncilId,
    ) -> CouncilResult<Option<&'r RecoveryRequest>> {
        Ok(registry.get(id)?.request.as_ref())
    }

    pub fn last_honest<'r>(
        &self,
        registry: &'r CouncilRegistry,
        id: &CouncilId,
    ) -> CouncilResult<Option<&'r LastHonestState>> {
        Ok(registry.get(id)?.last_honest.as_ref())
    }

    /// Lifecycle position at the current clock reading.
    pub fn status(&self, registry: &CouncilRegistry, id: &CouncilId) -> CouncilResult<RecoveryStatus> {
        let now = self.base.now()?;
        Ok(RecoveryStatus::derive(registry.get(id)?, now))
    }

    pub fn snapshot(&self, registry: &CouncilRegistry, id: &CouncilId) -> CouncilResult<CouncilView> {
        let now = self.base.now()?;
        Ok(CouncilView::capture(registry.get(id)?, now))
    }

    fn emit_stale(&self, id: &CouncilId, nonce: u64, now: PhysicalTime) {
        tracing::info!(council = %id, nonce, "expired recovery request cleared");
        self.base.emit(CouncilFact::StaleRequestCleared {
            council_id: id.clone(),
            nonce,
            at_ms: now.ts_ms,
        });
    }
}

fn rejected(id: &CouncilId, operation: &'static str, err: CouncilError) -> CouncilError {
    tracing::debug!(council = %id, operation, error = %err, "council operation rejected");
    err
}

fn ensure_unlocked(state: &CouncilState) -> CouncilResult<()> {
    if state.council.locked {
        return Err(CouncilError::Locked);
    }
    Ok(())
}

/// Active request that is still within its deadline.
fn live_request(state: &CouncilState, now: PhysicalTime) -> CouncilResult<&RecoveryRequest> {
    let request = state.request.as_ref().ok_or(CouncilError::NoActiveProposal)?;
    if request.is_expired_at(now) {
        return Err(CouncilError::ProposalExpired {
            deadline_ms: request.deadline.ts_ms,
            now_ms: now.ts_ms,
        });
    }
    Ok(request)
}

fn check_propose(state: &CouncilState, proposer: &Address, now: PhysicalTime) -> CouncilResult<()> {
    ensure_unlocked(state)?;
    if !state.is_guardian(proposer) {
        return Err(CouncilError::Unauthorized { caller: *proposer });
    }
    if let Some(request) = state.request.as_ref() {
        if !request.is_expired_at(now) {
            return Err(CouncilError::ActiveProposalExists {
                nonce: request.nonce,
            });
        }
    }
    if let Some(window) = compromise::open_window(state, now) {
        return Err(CouncilError::not_allowed(format!(
            "last honest window for {} open until {}",
            window.guardian, window.deadline
        )));
    }
    Ok(())
}

fn check_approve(state: &CouncilState, guardian: &Address, now: PhysicalTime) -> CouncilResult<()> {
    if !state.is_guardian(guardian) {
        return Err(CouncilError::NotGuardian { guardian: *guardian });
    }
    ensure_unlocked(state)?;
    let request = live_request(state, now)?;
    if request.has_approved(guardian) {
        return Err(CouncilError::AlreadyApproved {
            guardian: *guardian,
            nonce: request.nonce,
        });
    }
    Ok(())
}

fn check_revoke(state: &CouncilState, guardian: &Address, now: PhysicalTime) -> CouncilResult<()> {
    if !state.is_guardian(guardian) {
        return Err(CouncilError::NotGuardian { guardian: *guardian });
    }
    ensure_unlocked(state)?;
    let request = live_request(state, now)?;
    if !request.has_approved(guardian) {
        return Err(CouncilError::NothingToDo { guardian: *guardian });
    }
    Ok(())
}

fn check_execute(state: &CouncilState, now: PhysicalTime) -> CouncilResult<()> {
    ensure_unlocked(state)?;
    let request = live_request(state, now)?;
    let approvals = request.approval_count();
    let threshold = state.council.threshold;
    if approvals < threshold {
        return Err(CouncilError::ThresholdNotMet {
            approvals,
            threshold,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{FactLog, RecoveryEffectSystem};
    use warden_core::time::MS_PER_DAY;
    use warden_core::SimulatedTimeHandler;

    type Effects = RecoveryEffectSystem<SimulatedTimeHandler, Arc<FactLog>>;

    struct Fixture {
        clock: SimulatedTimeHandler,
        log: Arc<FactLog>,
        recovery: RecoveryCoordinator<Effects>,
        registry: CouncilRegistry,
        id: CouncilId,
    }

    fn addr(seed: u8) -> Address {
        Address::new([seed; 20])
    }

    fn fixture(size: u8, threshold: usize) -> Fixture {
        let clock = SimulatedTimeHandler::new(0);
        let log = Arc::new(FactLog::new());
        let effects = Arc::new(RecoveryEffectSystem::new(clock.clone(), log.clone()));
        let config = RecoveryConfig::default();
        let membership = GuardianMembershipManager::new(effects.clone(), config.clone());
        let mut registry = CouncilRegistry::new();
        let id = CouncilId::deployer();
        membership
            .init_council(&mut registry, id.clone(), (1..=size).map(addr).collect(), threshold)
            .unwrap();
        Fixture {
            clock,
            log,
            recovery: RecoveryCoordinator::new(effects, config),
            registry,
            id,
        }
    }

    #[test]
    fn test_propose_preconditions() {
        let mut f = fixture(3, 2);
        assert_eq!(
            f.recovery.propose(&mut f.registry, &f.id, addr(9), addr(0xaa)),
            Err(CouncilError::Unauthorized { caller: addr(9) })
        );
        assert!(matches!(
            f.recovery.propose(&mut f.registry, &f.id, addr(1), Address::ZERO),
            Err(CouncilError::InvalidParams { .. })
        ));
        assert_eq!(f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)), Ok(1));
        assert_eq!(
            f.recovery.propose(&mut f.registry, &f.id, addr(2), addr(0xbb)),
            Err(CouncilError::ActiveProposalExists { nonce: 1 })
        );
    }

    #[test]
    fn test_propose_replaces_expired_request() {
        let mut f = fixture(3, 2);
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        f.recovery.approve(&mut f.registry, &f.id, addr(1)).unwrap();
        f.clock.advance_ms(3 * MS_PER_DAY + 1);

        assert_eq!(f.recovery.propose(&mut f.registry, &f.id, addr(2), addr(0xbb)), Ok(2));
        let request = f.recovery.active_request(&f.registry, &f.id).unwrap().unwrap();
        assert_eq!(request.proposed_account, addr(0xbb));
        assert_eq!(request.approval_count(), 0);

        let subtypes: Vec<_> = f.log.snapshot().iter().map(CouncilFact::sub_type).collect();
        assert!(subtypes.ends_with(&["stale-request-cleared", "recovery-proposed"]));
    }

    #[test]
    fn test_approve_and_revoke_counts() {
        let mut f = fixture(5, 3);
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        assert_eq!(f.recovery.approve(&mut f.registry, &f.id, addr(1)), Ok(1));
        assert_eq!(f.recovery.approve(&mut f.registry, &f.id, addr(2)), Ok(2));
        assert_eq!(
            f.recovery.approve(&mut f.registry, &f.id, addr(2)),
            Err(CouncilError::AlreadyApproved {
                guardian: addr(2),
                nonce: 1
            })
        );
        assert_eq!(f.recovery.revoke(&mut f.registry, &f.id, addr(2)), Ok(1));
        assert_eq!(
            f.recovery.revoke(&mut f.registry, &f.id, addr(3)),
            Err(CouncilError::NothingToDo { guardian: addr(3) })
        );
        assert_eq!(
            f.recovery.revoke(&mut f.registry, &f.id, addr(9)),
            Err(CouncilError::NotGuardian { guardian: addr(9) })
        );
    }

    #[test]
    fn test_execute_requires_threshold() {
        let mut f = fixture(5, 3);
        assert_eq!(
            f.recovery.execute(&mut f.registry, &f.id),
            Err(CouncilError::NoActiveProposal)
        );
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        f.recovery.approve(&mut f.registry, &f.id, addr(1)).unwrap();
        let err = f.recovery.execute(&mut f.registry, &f.id).unwrap_err();
        assert_eq!(
            err,
            CouncilError::ThresholdNotMet {
                approvals: 1,
                threshold: 3
            }
        );
        assert!(err.is_retryable());

        f.recovery.approve(&mut f.registry, &f.id, addr(2)).unwrap();
        f.recovery.approve(&mut f.registry, &f.id, addr(3)).unwrap();
        assert_eq!(f.recovery.execute(&mut f.registry, &f.id), Ok(addr(0xaa)));
        assert_eq!(
            f.recovery.execute(&mut f.registry, &f.id),
            Err(CouncilError::NoActiveProposal)
        );
        assert_eq!(f.recovery.status(&f.registry, &f.id), Ok(RecoveryStatus::Idle));
    }

    #[test]
    fn test_expired_request_blocks_votes_and_execution() {
        let mut f = fixture(3, 1);
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        f.recovery.approve(&mut f.registry, &f.id, addr(1)).unwrap();
        f.clock.advance_ms(3 * MS_PER_DAY + 1);

        assert!(matches!(
            f.recovery.approve(&mut f.registry, &f.id, addr(2)),
            Err(CouncilError::ProposalExpired { .. })
        ));
        assert!(matches!(
            f.recovery.revoke(&mut f.registry, &f.id, addr(1)),
            Err(CouncilError::ProposalExpired { .. })
        ));
        assert!(matches!(
            f.recovery.execute(&mut f.registry, &f.id),
            Err(CouncilError::ProposalExpired { .. })
        ));
        assert_eq!(f.recovery.clear_expired(&mut f.registry, &f.id), Ok(true));
        assert_eq!(f.recovery.clear_expired(&mut f.registry, &f.id), Ok(false));
    }

    #[test]
    fn test_rejected_call_does_not_mutate() {
        let mut f = fixture(3, 2);
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        f.recovery.approve(&mut f.registry, &f.id, addr(1)).unwrap();
        let before = f.registry.clone();
        let facts_before = f.log.len();

        assert!(f.recovery.approve(&mut f.registry, &f.id, addr(1)).is_err());
        assert!(f.recovery.execute(&mut f.registry, &f.id).is_err());
        assert!(f.recovery.propose(&mut f.registry, &f.id, addr(2), addr(0xbb)).is_err());
        assert_eq!(f.registry, before);
        assert_eq!(f.log.len(), facts_before);
    }

    #[test]
    fn test_lock_blocks_everything_but_reset() {
        let mut f = fixture(3, 2);
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        for seed in 1..=3 {
            f.recovery.approve(&mut f.registry, &f.id, addr(seed)).unwrap();
        }
        assert_eq!(f.recovery.status(&f.registry, &f.id), Ok(RecoveryStatus::Locked));
        assert_eq!(f.recovery.execute(&mut f.registry, &f.id), Err(CouncilError::Locked));
        assert_eq!(f.recovery.revoke(&mut f.registry, &f.id, addr(1)), Err(CouncilError::Locked));
        assert_eq!(
            f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xbb)),
            Err(CouncilError::Locked)
        );
        assert_eq!(f.recovery.clear_expired(&mut f.registry, &f.id), Err(CouncilError::Locked));
    }

    #[test]
    fn test_open_window_outlives_expired_request() {
        let mut f = fixture(4, 3);
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        f.clock.advance_ms(3 * MS_PER_DAY - 10);
        for seed in 1..=3 {
            f.recovery.approve(&mut f.registry, &f.id, addr(seed)).unwrap();
        }
        f.clock.advance_ms(20);

        assert_eq!(
            f.recovery.status(&f.registry, &f.id).unwrap().name(),
            "last_honest_window_open"
        );
        let before = f.registry.clone();
        let facts_before = f.log.len();
        assert_eq!(f.recovery.clear_expired(&mut f.registry, &f.id), Ok(false));
        assert!(matches!(
            f.recovery.propose(&mut f.registry, &f.id, addr(2), addr(0xbb)),
            Err(CouncilError::NotAllowed { .. })
        ));
        assert!(matches!(
            f.recovery
                .check_capability(&f.registry, &f.id, addr(1), Capability::Propose),
            Err(CouncilError::NotAllowed { .. })
        ));
        assert_eq!(f.registry, before);
        assert_eq!(f.log.len(), facts_before);

        assert_eq!(
            f.recovery
                .check_capability(&f.registry, &f.id, addr(4), Capability::LastHonestReset),
            Ok(())
        );
        f.recovery
            .last_honest_reset(&mut f.registry, &f.id, addr(4), vec![addr(4), addr(5)], 1)
            .unwrap();
        assert_eq!(f.recovery.status(&f.registry, &f.id), Ok(RecoveryStatus::Idle));
    }

    #[test]
    fn test_expired_request_clears_once_window_closes() {
        let mut f = fixture(4, 3);
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        for seed in 1..=3 {
            f.recovery.approve(&mut f.registry, &f.id, addr(seed)).unwrap();
        }
        f.clock.advance_ms(3 * MS_PER_DAY + 1);

        assert_eq!(f.recovery.clear_expired(&mut f.registry, &f.id), Ok(true));
        assert_eq!(f.recovery.last_honest(&f.registry, &f.id), Ok(None));
        assert_eq!(f.recovery.propose(&mut f.registry, &f.id, addr(2), addr(0xbb)), Ok(2));
    }

    #[test]
    fn test_locked_council_rejects_outsider_propose_as_locked() {
        let mut f = fixture(3, 2);
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        for seed in 1..=3 {
            f.recovery.approve(&mut f.registry, &f.id, addr(seed)).unwrap();
        }
        assert_eq!(
            f.recovery.propose(&mut f.registry, &f.id, addr(9), addr(0xbb)),
            Err(CouncilError::Locked)
        );
    }

    #[test]
    fn test_capability_matches_real_call() {
        let mut f = fixture(3, 2);
        let check = |f: &Fixture, caller: u8, capability| {
            f.recovery
                .check_capability(&f.registry, &f.id, addr(caller), capability)
        };

        assert_eq!(check(&f, 1, Capability::Propose), Ok(()));
        assert_eq!(
            check(&f, 9, Capability::Propose),
            Err(CouncilError::Unauthorized { caller: addr(9) })
        );
        assert_eq!(check(&f, 1, Capability::Approve), Err(CouncilError::NoActiveProposal));

        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        assert_eq!(check(&f, 2, Capability::Approve), Ok(()));
        assert_eq!(
            check(&f, 2, Capability::Revoke),
            Err(CouncilError::NothingToDo { guardian: addr(2) })
        );
        assert!(matches!(
            check(&f, 1, Capability::Execute),
            Err(CouncilError::ThresholdNotMet { .. })
        ));
        assert_eq!(
            check(&f, 3, Capability::LastHonestReset),
            Err(CouncilError::NotLastHonest { caller: addr(3) })
        );
    }

    #[test]
    fn test_last_honest_reset_rejects_bad_membership_without_mutation() {
        let mut f = fixture(3, 2);
        f.recovery.propose(&mut f.registry, &f.id, addr(1), addr(0xaa)).unwrap();
        f.recovery.approve(&mut f.registry, &f.id, addr(1)).unwrap();
        f.recovery.approve(&mut f.registry, &f.id, addr(2)).unwrap();
        let before = f.registry.clone();

        assert!(matches!(
            f.recovery
                .last_honest_reset(&mut f.registry, &f.id, addr(3), vec![addr(7)], 2),
            Err(CouncilError::InvalidParams { .. })
        ));
        assert_eq!(f.registry, before);

        f.recovery
            .last_honest_reset(&mut f.registry, &f.id, addr(3), vec![addr(3), addr(7)], 2)
            .unwrap();
        assert!(f.recovery.active_request(&f.registry, &f.id).unwrap().is_none());
        assert!(f.recovery.last_honest(&f.registry, &f.id).unwrap().is_none());
    }
}
