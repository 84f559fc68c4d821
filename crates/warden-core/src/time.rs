//! Physical time and the clock effect interface
//!
//! All council deadlines are absolute millisecond timestamps taken from an
//! injected clock. Nothing in the protocol reads the system clock directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Milliseconds in one second
pub const MS_PER_SECOND: u64 = 1_000;
/// Milliseconds in one day
pub const MS_PER_DAY: u64 = 24 * 60 * 60 * MS_PER_SECOND;

/// A physical timestamp in milliseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PhysicalTime {
    /// Milliseconds since the UNIX epoch
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// Create from milliseconds
    pub const fn from_ms(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Absolute deadline `duration_ms` after this instant, saturating at `u64::MAX`
    pub fn deadline_after(&self, duration_ms: u64) -> PhysicalTime {
        PhysicalTime {
            ts_ms: self.ts_ms.saturating_add(duration_ms),
        }
    }

    /// Whether this instant is strictly later than `deadline`
    pub fn is_past(&self, deadline: PhysicalTime) -> bool {
        self.ts_ms > deadline.ts_ms
    }
}

impl From<Duration> for PhysicalTime {
    fn from(since_epoch: Duration) -> Self {
        Self::from_ms(u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for PhysicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}

/// Error type for time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    #[error("Clock unavailable: {reason}")]
    ClockUnavailable { reason: String },
}

/// Clock interface consumed by the recovery protocol.
///
/// Implementations must be monotonic. Reads never block.
pub trait PhysicalTimeEffects: Send + Sync {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError>;
}

impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for Arc<T> {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        (**self).physical_time()
    }
}

impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for &T {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        (**self).physical_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_deadline_is_inclusive(
            start in 0u64..(u64::MAX / 2),
            ttl in 0u64..(u64::MAX / 4),
            offset in 0u64..(u64::MAX / 4),
        ) {
            let opened = PhysicalTime::from_ms(start);
            let deadline = opened.deadline_after(ttl);
            let probe = opened.deadline_after(offset);
            prop_assert_eq!(probe.is_past(deadline), offset > ttl);
        }
    }

    #[test]
    fn test_deadline_after_saturates() {
        let t = PhysicalTime::from_ms(u64::MAX - 5);
        assert_eq!(t.deadline_after(10).ts_ms, u64::MAX);
    }

    #[test]
    fn test_is_past_is_strict() {
        let deadline = PhysicalTime::from_ms(1_000);
        assert!(!PhysicalTime::from_ms(1_000).is_past(deadline));
        assert!(PhysicalTime::from_ms(1_001).is_past(deadline));
    }

    #[test]
    fn test_from_duration() {
        let t = PhysicalTime::from(Duration::from_secs(3));
        assert_eq!(t.ts_ms, 3 * MS_PER_SECOND);
    }
}
