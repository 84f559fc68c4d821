//! Deterministic identities and a ready-made council harness
//!
//! Identities are derived by hashing a label, so the same seed yields the same
//! address in every test run.

use crate::sink::RecordingFactSink;
use crate::time::ControllableClock;
use std::sync::Arc;
use warden_core::{hash, Address, CouncilId, RecoveryConfig};
use warden_recovery::{
    CouncilRegistry, CouncilState, GuardianMembershipManager, RecoveryCoordinator,
    RecoveryEffectSystem,
};

/// Effect system used by every fixture
pub type TestEffects = RecoveryEffectSystem<ControllableClock, Arc<RecordingFactSink>>;

fn labelled_address(label: &str) -> Address {
    let digest = hash::hash(label.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[..20]);
    Address::new(bytes)
}

/// Guardian address number `seed`
pub fn guardian(seed: u64) -> Address {
    labelled_address(&format!("guardian-{seed}"))
}

/// Guardians `1..=n`
pub fn guardians(n: u64) -> Vec<Address> {
    (1..=n).map(guardian).collect()
}

/// Address that is never one of [`guardians`]
pub fn outsider(seed: u64) -> Address {
    labelled_address(&format!("outsider-{seed}"))
}

/// Candidate account address number `seed`
pub fn candidate(seed: u64) -> Address {
    labelled_address(&format!("candidate-{seed}"))
}

/// Fresh effect system at time zero
pub fn test_effects() -> (Arc<TestEffects>, ControllableClock, Arc<RecordingFactSink>) {
    let clock = ControllableClock::at_epoch();
    let facts = Arc::new(RecordingFactSink::new());
    let effects = Arc::new(RecoveryEffectSystem::new(clock.clone(), Arc::clone(&facts)));
    (effects, clock, facts)
}

/// One council plus the coordinators driving it.
pub struct CouncilHarness {
    pub id: CouncilId,
    pub clock: ControllableClock,
    pub facts: Arc<RecordingFactSink>,
    pub registry: CouncilRegistry,
    pub membership: GuardianMembershipManager<TestEffects>,
    pub recovery: RecoveryCoordinator<TestEffects>,
    pub guardians: Vec<Address>,
}

impl CouncilHarness {
    /// Council of `size` guardians with `threshold`, default timing.
    pub fn new(size: u64, threshold: usize) -> Self {
        Self::with_config(size, threshold, RecoveryConfig::default())
    }

    /// Same as [`CouncilHarness::new`] with explicit timing.
    pub fn with_config(size: u64, threshold: usize, config: RecoveryConfig) -> Self {
        let (effects, clock, facts) = test_effects();
        let membership = GuardianMembershipManager::new(Arc::clone(&effects), config.clone());
        let recovery = RecoveryCoordinator::new(effects, config);
        let mut registry = CouncilRegistry::new();
        let id = CouncilId::deployer();
        let guardians = guardians(size);
        membership
            .init_council(&mut registry, id.clone(), guardians.clone(), threshold)
            .expect("fixture council parameters are valid");
        Self {
            id,
            clock,
            facts,
            registry,
            membership,
            recovery,
            guardians,
        }
    }

    /// Guardian at 1-based position `n`, as in "g1 .. gN"
    pub fn g(&self, n: usize) -> Address {
        self.guardians[n - 1]
    }

    pub fn state(&self) -> &CouncilState {
        self.registry
            .get(&self.id)
            .expect("harness council exists")
    }

    pub fn propose(&mut self, proposer: Address, candidate: Address) -> warden_recovery::CouncilResult<u64> {
        self.recovery
            .propose(&mut self.registry, &self.id, proposer, candidate)
    }

    pub fn approve(&mut self, guardian: Address) -> warden_recovery::CouncilResult<usize> {
        self.recovery.approve(&mut self.registry, &self.id, guardian)
    }

    pub fn revoke(&mut self, guardian: Address) -> warden_recovery::CouncilResult<usize> {
        self.recovery.revoke(&mut self.registry, &self.id, guardian)
    }

    pub fn execute(&mut self) -> warden_recovery::CouncilResult<Address> {
        self.recovery.execute(&mut self.registry, &self.id)
    }

    /// Approve by guardians `1..=n`, panicking on any failure.
    pub fn approve_first(&mut self, n: usize) {
        for i in 1..=n {
            let guardian = self.g(i);
            self.approve(guardian)
                .unwrap_or_else(|err| panic!("approval by g{i} failed: {err}"));
        }
    }
}
