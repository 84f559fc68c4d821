//! Guardian membership management
//!
//! Creates councils and changes their guardian set or threshold. Two kinds of
//! change exist:
//!
//! - **Resets** (`owner_reset`, and the last honest reset driven by the
//!   recovery coordinator) replace the whole membership, clear any in-flight
//!   request and unlock the council.
//! - **Incremental changes** (`set_guardian`, `add_guardian`,
//!   `remove_guardian`, `set_threshold`) are refused while the council is
//!   locked. Each one discards the active request and any last honest window,
//!   since approvals were collected against the old membership.
//!
//! Authorization of the caller is the host's job (see
//! [`ProtectedAccountOwner`](crate::owner::ProtectedAccountOwner)).

use crate::coordinator::{BaseCoordinator, BaseCoordinatorAccess};
use crate::effects::RecoveryEffects;
use crate::errors::{CouncilError, CouncilResult};
use crate::facts::{CouncilFact, ResetKind};
use crate::registry::CouncilRegistry;
use crate::types::{check_threshold, Council, CouncilState, GuardianSet};
use std::sync::Arc;
use warden_core::{Address, CouncilId, PhysicalTime, RecoveryConfig};

/// Membership coordinator.
pub struct GuardianMembershipManager<E: RecoveryEffects> {
    base: BaseCoordinator<E>,
}

impl<E: RecoveryEffects> BaseCoordinatorAccess<E> for GuardianMembershipManager<E> {
    fn base(&self) -> &BaseCoordinator<E> {
        &self.base
    }
}

impl<E: RecoveryEffects> GuardianMembershipManager<E> {
    pub fn new(effect_system: Arc<E>, config: RecoveryConfig) -> Self {
        Self {
            base: BaseCoordinator::new(effect_system, config),
        }
    }

    pub(crate) fn from_base(base: BaseCoordinator<E>) -> Self {
        Self { base }
    }

    /// Create council `id`.
    ///
    /// Fails `InvalidParams` unless `1 <= threshold <= members.len() <=
    /// max_guardians`, `ZeroAddress`/`DuplicateGuardian` on bad entries and
    /// `CouncilExists` when the id is taken.
    pub fn init_council(
        &self,
        registry: &mut CouncilRegistry,
        id: CouncilId,
        members: Vec<Address>,
        threshold: usize,
    ) -> CouncilResult<()> {
        if registry.contains(&id) {
            return Err(CouncilError::CouncilExists { council: id });
        }
        let council = self.build_council(members, threshold)?;
        let now = self.base.now()?;

        let fact = CouncilFact::CouncilInitialized {
            council_id: id.clone(),
            members: council.members.as_slice().to_vec(),
            threshold,
            at_ms: now.ts_ms,
        };
        registry.insert(CouncilState::new(id.clone(), council))?;

        tracing::info!(council = %id, threshold, "council initialized");
        self.base.emit(fact);
        Ok(())
    }

    /// Replace membership and threshold, clear in-flight state and unlock.
    ///
    /// Available in every state, including `Locked`.
    pub fn owner_reset(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
        members: Vec<Address>,
        threshold: usize,
    ) -> CouncilResult<()> {
        let council = self.build_council(members, threshold)?;
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        self.reset_council(state, council, ResetKind::Owner, now);
        Ok(())
    }

    /// Overwrite the guardian at slot `index`.
    pub fn set_guardian(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
        index: usize,
        guardian: Address,
    ) -> CouncilResult<()> {
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        ensure_unlocked(state)?;
        let size = state.council.size();
        if index >= size {
            return Err(CouncilError::IndexOutOfRange { index, size });
        }
        if guardian.is_zero() {
            return Err(CouncilError::ZeroAddress);
        }
        if state.is_guardian(&guardian) {
            return Err(CouncilError::DuplicateGuardian { guardian });
        }

        let Some(previous) = state.council.members.replace_at(index, guardian) else {
            return Err(CouncilError::IndexOutOfRange { index, size });
        };
        let cleared_nonce = state.clear_in_flight();

        tracing::info!(
            council = %id,
            index,
            previous = %previous,
            guardian = %guardian,
            "guardian replaced"
        );
        self.base.emit(CouncilFact::GuardianReplaced {
            council_id: id.clone(),
            index,
            previous,
            guardian,
            cleared_nonce,
            at_ms: now.ts_ms,
        });
        Ok(())
    }

    /// Append a guardian.
    pub fn add_guardian(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
        guardian: Address,
    ) -> CouncilResult<()> {
        let max_guardians = self.base.config().max_guardians;
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        ensure_unlocked(state)?;
        if guardian.is_zero() {
            return Err(CouncilError::ZeroAddress);
        }
        if state.is_guardian(&guardian) {
            return Err(CouncilError::DuplicateGuardian { guardian });
        }
        if state.council.size() >= max_guardians {
            return Err(CouncilError::invalid(format!(
                "council already has the maximum of {max_guardians} guardians"
            )));
        }

        state.council.members.push(guardian);
        let cleared_nonce = state.clear_in_flight();

        tracing::info!(
            council = %id,
            guardian = %guardian,
            size = state.council.size(),
            "guardian added"
        );
        self.base.emit(CouncilFact::GuardianAdded {
            council_id: id.clone(),
            guardian,
            cleared_nonce,
            at_ms: now.ts_ms,
        });
        Ok(())
    }

    /// Remove a guardian, keeping the order of the others.
    ///
    /// Refused when the remaining set would be smaller than the threshold.
    pub fn remove_guardian(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
        guardian: Address,
    ) -> CouncilResult<()> {
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        ensure_unlocked(state)?;
        if !state.is_guardian(&guardian) {
            return Err(CouncilError::NotGuardian { guardian });
        }
        let remaining = state.council.size() - 1;
        if remaining < state.council.threshold {
            return Err(CouncilError::invalid(format!(
                "removing {guardian} leaves {remaining} guardians below threshold {}",
                state.council.threshold
            )));
        }

        state.council.members.remove(&guardian);
        let cleared_nonce = state.clear_in_flight();

        tracing::info!(
            council = %id,
            guardian = %guardian,
            size = remaining,
            "guardian removed"
        );
        self.base.emit(CouncilFact::GuardianRemoved {
            council_id: id.clone(),
            guardian,
            cleared_nonce,
            at_ms: now.ts_ms,
        });
        Ok(())
    }

    /// Change the approval threshold.
    pub fn set_threshold(
        &self,
        registry: &mut CouncilRegistry,
        id: &CouncilId,
        threshold: usize,
    ) -> CouncilResult<()> {
        let now = self.base.now()?;
        let state = registry.get_mut(id)?;
        ensure_unlocked(state)?;
        check_threshold(threshold, state.council.size())?;

        let previous = std::mem::replace(&mut state.council.threshold, threshold);
        let cleared_nonce = state.clear_in_flight();

        tracing::info!(council = %id, previous, threshold, "threshold changed");
        self.base.emit(CouncilFact::ThresholdChanged {
            council_id: id.clone(),
            previous,
            threshold,
            cleared_nonce,
            at_ms: now.ts_ms,
        });
        Ok(())
    }

    /// Validate a replacement membership against the configured limits.
    pub(crate) fn build_council(
        &self,
        members: Vec<Address>,
        threshold: usize,
    ) -> CouncilResult<Council> {
        let members = GuardianSet::try_new(members, self.base.config().max_guardians)?;
        Council::new(members, threshold)
    }

    /// Install an already validated council. Infallible so callers can run
    /// every check first.
    pub(crate) fn reset_council(
        &self,
        state: &mut CouncilState,
        council: Council,
        kind: ResetKind,
        now: PhysicalTime,
    ) {
        let cleared_nonce = state.clear_in_flight();
        let members = council.members.as_slice().to_vec();
        let threshold = council.threshold;
        state.council = council;

        match kind {
            ResetKind::Owner => {
                tracing::info!(council = %state.id, threshold, "council reset by owner");
            }
            ResetKind::LastHonest { guardian } => {
                tracing::warn!(
                    council = %state.id,
                    guardian = %guardian,
                    threshold,
                    "council reset by last honest guardian"
                );
            }
        }
        self.base.emit(CouncilFact::CouncilReset {
            council_id: state.id.clone(),
            kind,
            members,
            threshold,
            cleared_nonce,
            at_ms: now.ts_ms,
        });
    }
}

fn ensure_unlocked(state: &CouncilState) -> CouncilResult<()> {
    if state.council.locked {
        tracing::debug!(council = %state.id, "membership change refused: council locked");
        return Err(CouncilError::Locked);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{FactLog, RecoveryEffectSystem};
    use crate::types::{LastHonestState, RecoveryRequest};
    use std::collections::BTreeSet;
    use warden_core::SimulatedTimeHandler;

    type Effects = RecoveryEffectSystem<SimulatedTimeHandler, Arc<FactLog>>;

    fn addr(seed: u8) -> Address {
        Address::new([seed; 20])
    }

    fn setup(n: u8, threshold: usize) -> (GuardianMembershipManager<Effects>, CouncilRegistry, Arc<FactLog>) {
        let log = Arc::new(FactLog::new());
        let effects = Arc::new(RecoveryEffectSystem::new(
            SimulatedTimeHandler::new(0),
            log.clone(),
        ));
        let manager = GuardianMembershipManager::new(effects, RecoveryConfig::default());
        let mut registry = CouncilRegistry::new();
        manager
            .init_council(
                &mut registry,
                CouncilId::admin(),
                (1..=n).map(addr).collect(),
                threshold,
            )
            .unwrap();
        (manager, registry, log)
    }

    fn open_request(registry: &mut CouncilRegistry) {
        let state = registry.get_mut(&CouncilId::admin()).unwrap();
        state.nonce += 1;
        state.request = Some(RecoveryRequest {
            proposed_account: addr(0xaa),
            proposer: addr(1),
            created_at: PhysicalTime::from_ms(0),
            deadline: PhysicalTime::from_ms(1_000),
            approvals: BTreeSet::from([addr(1)]),
            nonce: state.nonce,
        });
    }

    /// Request at `size - 1` approvals with the holdout's window open.
    fn open_window(registry: &mut CouncilRegistry, size: u8) {
        open_request(registry);
        let state = registry.get_mut(&CouncilId::admin()).unwrap();
        if let Some(request) = state.request.as_mut() {
            request.approvals = (1..size).map(addr).collect();
        }
        state.last_honest = Some(LastHonestState {
            guardian: addr(size),
            opened_at: PhysicalTime::from_ms(0),
            deadline: PhysicalTime::from_ms(1_000),
            nonce: state.nonce,
        });
    }

    fn assert_in_flight_cleared(registry: &CouncilRegistry, log: &FactLog) {
        let state = registry.get(&CouncilId::admin()).unwrap();
        assert!(state.request.is_none());
        assert!(state.last_honest.is_none());
        let cleared = match log.snapshot().last() {
            Some(
                CouncilFact::GuardianAdded { cleared_nonce, .. }
                | CouncilFact::GuardianRemoved { cleared_nonce, .. }
                | CouncilFact::GuardianReplaced { cleared_nonce, .. }
                | CouncilFact::ThresholdChanged { cleared_nonce, .. },
            ) => *cleared_nonce,
            other => panic!("unexpected fact {other:?}"),
        };
        assert_eq!(cleared, Some(1));
    }

    #[test]
    fn test_set_guardian_clears_open_window() {
        let (manager, mut registry, log) = setup(4, 2);
        open_window(&mut registry, 4);
        manager
            .set_guardian(&mut registry, &CouncilId::admin(), 3, addr(9))
            .unwrap();
        assert_in_flight_cleared(&registry, &log);
    }

    #[test]
    fn test_add_guardian_clears_open_window() {
        let (manager, mut registry, log) = setup(4, 2);
        open_window(&mut registry, 4);
        manager
            .add_guardian(&mut registry, &CouncilId::admin(), addr(9))
            .unwrap();
        assert_in_flight_cleared(&registry, &log);
    }

    #[test]
    fn test_set_threshold_clears_open_window() {
        let (manager, mut registry, log) = setup(4, 2);
        open_window(&mut registry, 4);
        manager
            .set_threshold(&mut registry, &CouncilId::admin(), 3)
            .unwrap();
        assert_in_flight_cleared(&registry, &log);
    }

    #[test]
    fn test_remove_guardian_clears_open_window() {
        let (manager, mut registry, log) = setup(4, 2);
        open_window(&mut registry, 4);
        manager
            .remove_guardian(&mut registry, &CouncilId::admin(), addr(4))
            .unwrap();
        assert_in_flight_cleared(&registry, &log);
    }

    #[test]
    fn test_init_rejects_bad_parameters() {
        let (manager, mut registry, _) = setup(3, 2);
        let id = CouncilId::deployer();
        assert!(matches!(
            manager.init_council(&mut registry, id.clone(), vec![addr(1)], 2),
            Err(CouncilError::InvalidParams { .. })
        ));
        assert_eq!(
            manager.init_council(&mut registry, id.clone(), vec![addr(1), addr(1)], 1),
            Err(CouncilError::DuplicateGuardian { guardian: addr(1) })
        );
        assert_eq!(
            manager.init_council(&mut registry, CouncilId::admin(), vec![addr(1)], 1),
            Err(CouncilError::CouncilExists {
                council: CouncilId::admin()
            })
        );
        assert!(!registry.contains(&id));
    }

    #[test]
    fn test_set_guardian_checks() {
        let (manager, mut registry, log) = setup(3, 2);
        let id = CouncilId::admin();
        assert_eq!(
            manager.set_guardian(&mut registry, &id, 3, addr(9)),
            Err(CouncilError::IndexOutOfRange { index: 3, size: 3 })
        );
        assert_eq!(
            manager.set_guardian(&mut registry, &id, 0, Address::ZERO),
            Err(CouncilError::ZeroAddress)
        );
        assert_eq!(
            manager.set_guardian(&mut registry, &id, 0, addr(2)),
            Err(CouncilError::DuplicateGuardian { guardian: addr(2) })
        );

        manager.set_guardian(&mut registry, &id, 1, addr(9)).unwrap();
        let members = registry.get(&id).unwrap().council.members.as_slice().to_vec();
        assert_eq!(members, vec![addr(1), addr(9), addr(3)]);
        assert_eq!(log.snapshot().last().unwrap().sub_type(), "guardian-replaced");
    }

    #[test]
    fn test_add_guardian_respects_maximum() {
        let (manager, mut registry, _) = setup(16, 2);
        assert!(matches!(
            manager.add_guardian(&mut registry, &CouncilId::admin(), addr(99)),
            Err(CouncilError::InvalidParams { .. })
        ));
    }

    #[test]
    fn test_remove_guardian_keeps_order_and_clears_request() {
        let (manager, mut registry, log) = setup(4, 2);
        let id = CouncilId::admin();
        open_request(&mut registry);

        manager.remove_guardian(&mut registry, &id, addr(2)).unwrap();
        let state = registry.get(&id).unwrap();
        assert_eq!(state.council.members.as_slice(), &[addr(1), addr(3), addr(4)]);
        assert!(!state.is_guardian(&addr(2)));
        assert!(state.request.is_none());
        assert_eq!(
            log.snapshot().last(),
            Some(&CouncilFact::GuardianRemoved {
                council_id: id,
                guardian: addr(2),
                cleared_nonce: Some(1),
                at_ms: 0,
            })
        );
    }

    #[test]
    fn test_remove_guardian_below_threshold_refused() {
        let (manager, mut registry, _) = setup(2, 2);
        let id = CouncilId::admin();
        assert!(matches!(
            manager.remove_guardian(&mut registry, &id, addr(1)),
            Err(CouncilError::InvalidParams { .. })
        ));
        assert_eq!(
            manager.remove_guardian(&mut registry, &id, addr(7)),
            Err(CouncilError::NotGuardian { guardian: addr(7) })
        );
    }

    #[test]
    fn test_incremental_changes_refused_while_locked() {
        let (manager, mut registry, _) = setup(3, 2);
        let id = CouncilId::admin();
        registry.get_mut(&id).unwrap().council.locked = true;

        assert_eq!(manager.add_guardian(&mut registry, &id, addr(9)), Err(CouncilError::Locked));
        assert_eq!(manager.remove_guardian(&mut registry, &id, addr(1)), Err(CouncilError::Locked));
        assert_eq!(manager.set_guardian(&mut registry, &id, 0, addr(9)), Err(CouncilError::Locked));
        assert_eq!(manager.set_threshold(&mut registry, &id, 1), Err(CouncilError::Locked));
    }

    #[test]
    fn test_owner_reset_unlocks_and_keeps_nonce() {
        let (manager, mut registry, _) = setup(3, 2);
        let id = CouncilId::admin();
        open_request(&mut registry);
        registry.get_mut(&id).unwrap().council.locked = true;

        manager
            .owner_reset(&mut registry, &id, vec![addr(7), addr(8)], 2)
            .unwrap();
        let state = registry.get(&id).unwrap();
        assert!(!state.council.locked);
        assert!(state.request.is_none());
        assert_eq!(state.nonce, 1);
        assert_eq!(state.council.members.as_slice(), &[addr(7), addr(8)]);
    }

    #[test]
    fn test_owner_reset_validation_leaves_state_untouched() {
        let (manager, mut registry, _) = setup(3, 2);
        let id = CouncilId::admin();
        let before = registry.get(&id).unwrap().clone();
        assert!(manager.owner_reset(&mut registry, &id, vec![addr(7)], 2).is_err());
        assert_eq!(registry.get(&id).unwrap(), &before);
    }

    #[test]
    fn test_set_threshold_bounds() {
        let (manager, mut registry, _) = setup(3, 2);
        let id = CouncilId::admin();
        assert!(manager.set_threshold(&mut registry, &id, 0).is_err());
        assert!(manager.set_threshold(&mut registry, &id, 4).is_err());
        manager.set_threshold(&mut registry, &id, 3).unwrap();
        assert_eq!(registry.get(&id).unwrap().council.threshold, 3);
    }
}
