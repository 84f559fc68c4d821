//! Controllable clock for deterministic council tests

use warden_core::time::{MS_PER_DAY, MS_PER_SECOND};
use warden_core::{PhysicalTime, PhysicalTimeEffects, SimulatedTimeHandler, TimeError};

/// Manually advanced clock. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ControllableClock {
    inner: SimulatedTimeHandler,
}

impl ControllableClock {
    /// Clock starting at `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            inner: SimulatedTimeHandler::new(start_ms),
        }
    }

    /// Clock starting at the epoch
    pub fn at_epoch() -> Self {
        Self::new(0)
    }

    pub fn now(&self) -> PhysicalTime {
        PhysicalTime::from_ms(self.inner.now_ms())
    }

    pub fn advance_ms(&self, ms: u64) {
        self.inner.advance_ms(ms);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.inner.advance_ms(secs.saturating_mul(MS_PER_SECOND));
    }

    pub fn advance_days(&self, days: u64) {
        self.inner.advance_ms(days.saturating_mul(MS_PER_DAY));
    }
}

impl PhysicalTimeEffects for ControllableClock {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        self.inner.physical_time()
    }
}
