//! Effect composition for council operations.
//!
//! Council operations need exactly two capabilities from their host:
//!
//! - **PhysicalTimeEffects**: the monotonic clock every deadline is measured on
//! - **FactSink**: where lifecycle notifications go
//!
//! [`RecoveryEffects`] bundles both and is blanket-implemented, so any type
//! providing the two halves can drive a coordinator. [`RecoveryEffectSystem`]
//! is the stock composition of a clock and a sink.
//!
//! # Usage
//!
//! ```ignore
//! use warden_recovery::effects::{FactLog, RecoveryEffectSystem};
//! use warden_core::SystemTimeHandler;
//!
//! let effects = RecoveryEffectSystem::new(SystemTimeHandler::new(), FactLog::new());
//! ```

use crate::facts::CouncilFact;
use parking_lot::Mutex;
use std::sync::Arc;
use warden_core::{PhysicalTime, PhysicalTimeEffects, TimeError};

/// Receiver of council lifecycle facts.
///
/// Emission is infallible from the protocol's point of view. A sink that can
/// fail must buffer or log on its own.
pub trait FactSink: Send + Sync {
    fn emit(&self, fact: &CouncilFact);
}

impl<T: FactSink + ?Sized> FactSink for Arc<T> {
    fn emit(&self, fact: &CouncilFact) {
        (**self).emit(fact);
    }
}

/// Sink that discards every fact.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FactSink for NullSink {
    fn emit(&self, _fact: &CouncilFact) {}
}

/// In-memory, append-only fact log.
#[derive(Debug, Default)]
pub struct FactLog {
    facts: Mutex<Vec<CouncilFact>>,
}

impl FactLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every fact emitted so far.
    pub fn snapshot(&self) -> Vec<CouncilFact> {
        self.facts.lock().clone()
    }

    /// Take every fact emitted so far, leaving the log empty.
    pub fn drain(&self) -> Vec<CouncilFact> {
        std::mem::take(&mut *self.facts.lock())
    }

    pub fn len(&self) -> usize {
        self.facts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.lock().is_empty()
    }
}

impl FactSink for FactLog {
    fn emit(&self, fact: &CouncilFact) {
        self.facts.lock().push(fact.clone());
    }
}

/// Composed effects required by council coordinators.
pub trait RecoveryEffects: PhysicalTimeEffects + FactSink {}

impl<T> RecoveryEffects for T where T: PhysicalTimeEffects + FactSink {}

/// A clock paired with a fact sink.
#[derive(Debug, Clone, Default)]
pub struct RecoveryEffectSystem<C, S> {
    clock: C,
    sink: S,
}

impl<C, S> RecoveryEffectSystem<C, S>
where
    C: PhysicalTimeEffects,
    S: FactSink,
{
    pub fn new(clock: C, sink: S) -> Self {
        Self { clock, sink }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<C: PhysicalTimeEffects, S: Send + Sync> PhysicalTimeEffects for RecoveryEffectSystem<C, S> {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        self.clock.physical_time()
    }
}

impl<C: Send + Sync, S: FactSink> FactSink for RecoveryEffectSystem<C, S> {
    fn emit(&self, fact: &CouncilFact) {
        self.sink.emit(fact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{CouncilId, SimulatedTimeHandler};

    fn fact(nonce: u64) -> CouncilFact {
        CouncilFact::CouncilLocked {
            council_id: CouncilId::admin(),
            nonce,
            at_ms: 0,
        }
    }

    #[test]
    fn test_fact_log_drain() {
        let log = FactLog::new();
        log.emit(&fact(1));
        log.emit(&fact(2));
        assert_eq!(log.len(), 2);
        assert_eq!(log.drain(), vec![fact(1), fact(2)]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_effect_system_delegates() {
        let clock = SimulatedTimeHandler::new(42);
        let log = Arc::new(FactLog::new());
        let effects = RecoveryEffectSystem::new(clock.clone(), log.clone());

        clock.advance_ms(8);
        assert_eq!(effects.physical_time().unwrap().ts_ms, 50);

        effects.emit(&fact(7));
        assert_eq!(log.snapshot(), vec![fact(7)]);
    }

    #[test]
    fn test_null_sink_is_recovery_effects() {
        fn assert_effects<E: RecoveryEffects>(_: &E) {}
        assert_effects(&RecoveryEffectSystem::new(SimulatedTimeHandler::new(0), NullSink));
    }
}
