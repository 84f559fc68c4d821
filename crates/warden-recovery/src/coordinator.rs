//! Coordinator infrastructure
//!
//! Coordinators are stateless: all council state lives in the
//! [`CouncilRegistry`](crate::registry::CouncilRegistry) passed to each call.
//! A coordinator only holds its effect system and the global
//! [`RecoveryConfig`].

use crate::effects::RecoveryEffects;
use crate::errors::CouncilResult;
use crate::facts::CouncilFact;
use std::sync::Arc;
use warden_core::{PhysicalTime, RecoveryConfig};

/// Effect access and fact emission shared by every coordinator.
pub struct BaseCoordinator<E: RecoveryEffects> {
    effect_system: Arc<E>,
    config: RecoveryConfig,
}

impl<E: RecoveryEffects> BaseCoordinator<E> {
    pub fn new(effect_system: Arc<E>, config: RecoveryConfig) -> Self {
        Self {
            effect_system,
            config,
        }
    }

    pub fn effect_system(&self) -> &Arc<E> {
        &self.effect_system
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Read the injected clock.
    pub fn now(&self) -> CouncilResult<PhysicalTime> {
        Ok(self.effect_system.physical_time()?)
    }

    /// Log and publish a fact.
    pub fn emit(&self, fact: CouncilFact) {
        tracing::trace!(
            council = %fact.council_id(),
            fact = fact.sub_type(),
            at_ms = fact.timestamp_ms(),
            "council fact emitted"
        );
        self.effect_system.emit(&fact);
    }
}

impl<E: RecoveryEffects> Clone for BaseCoordinator<E> {
    fn clone(&self) -> Self {
        Self {
            effect_system: Arc::clone(&self.effect_system),
            config: self.config.clone(),
        }
    }
}

/// Helper trait for coordinators built on [`BaseCoordinator`].
pub trait BaseCoordinatorAccess<E: RecoveryEffects> {
    fn base(&self) -> &BaseCoordinator<E>;
}
