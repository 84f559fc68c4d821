//! Clock handlers
//!
//! `SystemTimeHandler` reads the wall clock for production hosts.
//! `SimulatedTimeHandler` is a shared, manually advanced clock for replays and
//! tests; clones observe the same time.

use crate::time::{PhysicalTime, PhysicalTimeEffects, TimeError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock handler clamped to never move backwards.
#[derive(Debug, Default)]
pub struct SystemTimeHandler {
    last_ms: AtomicU64,
}

impl SystemTimeHandler {
    /// Create a new system clock handler
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhysicalTimeEffects for SystemTimeHandler {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|e| {
            TimeError::ClockUnavailable {
                reason: e.to_string(),
            }
        })?;
        let observed = PhysicalTime::from(since_epoch).ts_ms;
        // Wall clocks can step backwards under NTP; deadlines must not.
        let previous = self.last_ms.fetch_max(observed, Ordering::SeqCst);
        Ok(PhysicalTime::from_ms(previous.max(observed)))
    }
}

/// Manually driven clock.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTimeHandler {
    current_ms: Arc<AtomicU64>,
}

impl SimulatedTimeHandler {
    /// Create a clock starting at `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Current simulated timestamp
    pub fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }

    /// Advance by `ms` milliseconds
    pub fn advance_ms(&self, ms: u64) {
        let _ = self
            .current_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(ms))
            });
    }
}

impl PhysicalTimeEffects for SimulatedTimeHandler {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        Ok(PhysicalTime::from_ms(self.now_ms()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_clock_shared_between_clones() {
        let clock = SimulatedTimeHandler::new(100);
        let view = clock.clone();
        clock.advance_ms(50);
        assert_eq!(view.physical_time().unwrap().ts_ms, 150);
    }

    #[test]
    fn test_simulated_clock_saturates() {
        let clock = SimulatedTimeHandler::new(u64::MAX - 1);
        clock.advance_ms(10_000);
        assert_eq!(clock.now_ms(), u64::MAX);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemTimeHandler::new();
        let a = clock.physical_time().unwrap();
        let b = clock.physical_time().unwrap();
        assert!(b >= a);
    }
}
