//! Protected-account owner
//!
//! The owner is the host-side holder of the privileged addresses. It supplies
//! the initial guardian lists, is the only identity allowed to perform
//! owner resets and incremental membership changes, and applies the address
//! released by a successful recovery.
//!
//! The owner keeps its own record of each council's current protected
//! address; the protocol never infers a previous address from guardian
//! order.

use crate::effects::RecoveryEffects;
use crate::errors::{CouncilError, CouncilResult};
use crate::guardian_membership::GuardianMembershipManager;
use crate::recovery_protocol::{Capability, RecoveryCoordinator};
use crate::registry::CouncilRegistry;
use crate::state::{CouncilView, RecoveryStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use warden_core::{Address, CouncilId, RecoveryConfig, WardenConfig};

/// A protected address replaced through recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRotation {
    pub council_id: CouncilId,
    pub previous: Address,
    pub current: Address,
    /// Nonce of the executed request
    pub nonce: u64,
}

/// Host hook invoked after the owner applies a rotation.
pub trait RecoveryHandoff: Send + Sync {
    fn on_rotation(&self, rotation: &AccountRotation);
}

impl<T: RecoveryHandoff + ?Sized> RecoveryHandoff for Arc<T> {
    fn on_rotation(&self, rotation: &AccountRotation) {
        (**self).on_rotation(rotation);
    }
}

/// Handoff that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandoff;

impl RecoveryHandoff for NoopHandoff {
    fn on_rotation(&self, _rotation: &AccountRotation) {}
}

/// Owner of a set of council-protected addresses.
pub struct ProtectedAccountOwner<E: RecoveryEffects, H: RecoveryHandoff = NoopHandoff> {
    owner: Address,
    registry: CouncilRegistry,
    accounts: BTreeMap<CouncilId, Address>,
    membership: GuardianMembershipManager<E>,
    recovery: RecoveryCoordinator<E>,
    handoff: H,
}

impl<E: RecoveryEffects, H: RecoveryHandoff> ProtectedAccountOwner<E, H> {
    /// Owner with no councils yet.
    pub fn new(
        owner: Address,
        effect_system: Arc<E>,
        config: RecoveryConfig,
        handoff: H,
    ) -> CouncilResult<Self> {
        if owner.is_zero() {
            return Err(CouncilError::ZeroAddress);
        }
        Ok(Self {
            owner,
            registry: CouncilRegistry::new(),
            accounts: BTreeMap::new(),
            membership: GuardianMembershipManager::new(Arc::clone(&effect_system), config.clone()),
            recovery: RecoveryCoordinator::new(effect_system, config),
            handoff,
        })
    }

    /// Owner with every council of `config` registered.
    pub fn from_config(config: &WardenConfig, effect_system: Arc<E>, handoff: H) -> CouncilResult<Self> {
        let mut owner = Self::new(config.owner, effect_system, config.recovery.clone(), handoff)?;
        for council in &config.councils {
            owner.register_council(
                config.owner,
                council.id.clone(),
                council.account,
                council.members.clone(),
                council.threshold,
            )?;
        }
        Ok(owner)
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn registry(&self) -> &CouncilRegistry {
        &self.registry
    }

    pub fn recovery(&self) -> &RecoveryCoordinator<E> {
        &self.recovery
    }

    pub fn membership(&self) -> &GuardianMembershipManager<E> {
        &self.membership
    }

    /// Current protected address of council `id`.
    pub fn account(&self, id: &CouncilId) -> Option<Address> {
        self.accounts.get(id).copied()
    }

    /// Create a council protecting `account`.
    pub fn register_council(
        &mut self,
        caller: Address,
        id: CouncilId,
        account: Address,
        members: Vec<Address>,
        threshold: usize,
    ) -> CouncilResult<()> {
        self.ensure_owner(caller)?;
        if account.is_zero() {
            return Err(CouncilError::ZeroAddress);
        }
        self.membership
            .init_council(&mut self.registry, id.clone(), members, threshold)?;
        tracing::info!(council = %id, account = %account, "protected account registered");
        self.accounts.insert(id, account);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Owner-only membership operations
    // ------------------------------------------------------------------

    pub fn owner_reset(
        &mut self,
        caller: Address,
        id: &CouncilId,
        members: Vec<Address>,
        threshold: usize,
    ) -> CouncilResult<()> {
        self.ensure_owner(caller)?;
        self.membership
            .owner_reset(&mut self.registry, id, members, threshold)
    }

    pub fn add_guardian(&mut self, caller: Address, id: &CouncilId, guardian: Address) -> CouncilResult<()> {
        self.ensure_owner(caller)?;
        self.membership.add_guardian(&mut self.registry, id, guardian)
    }

    pub fn remove_guardian(&mut self, caller: Address, id: &CouncilId, guardian: Address) -> CouncilResult<()> {
        self.ensure_owner(caller)?;
        self.membership
            .remove_guardian(&mut self.registry, id, guardian)
    }

    pub fn set_guardian(
        &mut self,
        caller: Address,
        id: &CouncilId,
        index: usize,
        guardian: Address,
    ) -> CouncilResult<()> {
        self.ensure_owner(caller)?;
        self.membership
            .set_guardian(&mut self.registry, id, index, guardian)
    }

    pub fn set_threshold(&mut self, caller: Address, id: &CouncilId, threshold: usize) -> CouncilResult<()> {
        self.ensure_owner(caller)?;
        self.membership
            .set_threshold(&mut self.registry, id, threshold)
    }

    // ------------------------------------------------------------------
    // Guardian operations
    // ------------------------------------------------------------------

    pub fn propose(&mut self, caller: Address, id: &CouncilId, candidate: Address) -> CouncilResult<u64> {
        self.recovery.propose(&mut self.registry, id, caller, candidate)
    }

    pub fn approve(&mut self, caller: Address, id: &CouncilId) -> CouncilResult<usize> {
        self.recovery.approve(&mut self.registry, id, caller)
    }

    pub fn revoke(&mut self, caller: Address, id: &CouncilId) -> CouncilResult<usize> {
        self.recovery.revoke(&mut self.registry, id, caller)
    }

    pub fn last_honest_reset(
        &mut self,
        caller: Address,
        id: &CouncilId,
        members: Vec<Address>,
        threshold: usize,
    ) -> CouncilResult<()> {
        self.recovery
            .last_honest_reset(&mut self.registry, id, caller, members, threshold)
    }

    pub fn clear_expired(&mut self, id: &CouncilId) -> CouncilResult<bool> {
        self.recovery.clear_expired(&mut self.registry, id)
    }

    pub fn check_capability(&self, caller: Address, id: &CouncilId, capability: Capability) -> CouncilResult<()> {
        self.recovery
            .check_capability(&self.registry, id, caller, capability)
    }

    pub fn status(&self, id: &CouncilId) -> CouncilResult<RecoveryStatus> {
        self.recovery.status(&self.registry, id)
    }

    pub fn snapshot(&self, id: &CouncilId) -> CouncilResult<CouncilView> {
        self.recovery.snapshot(&self.registry, id)
    }

    /// Execute council `id`'s request and install its candidate.
    ///
    /// Any caller may trigger this once the threshold is met.
    pub fn finalize_recovery(&mut self, id: &CouncilId) -> CouncilResult<AccountRotation> {
        let Some(previous) = self.accounts.get(id).copied() else {
            return Err(CouncilError::CouncilNotFound { council: id.clone() });
        };
        let request = self.recovery.execute_request(&mut self.registry, id)?;
        let rotation = AccountRotation {
            council_id: id.clone(),
            previous,
            current: request.proposed_account,
            nonce: request.nonce,
        };
        self.accounts.insert(id.clone(), rotation.current);

        tracing::info!(
            council = %id,
            previous = %rotation.previous,
            current = %rotation.current,
            nonce = rotation.nonce,
            "protected account rotated"
        );
        self.handoff.on_rotation(&rotation);
        Ok(rotation)
    }

    fn ensure_owner(&self, caller: Address) -> CouncilResult<()> {
        if caller != self.owner {
            tracing::debug!(caller = %caller, "owner operation refused");
            return Err(CouncilError::Unauthorized { caller });
        }
        Ok(())
    }
}
