use std::time::{Duration, Instant};

/// Repeating schedule anchored at a fixed instant.
///
/// Fire counts are always derived from `now - anchor`, never from an
/// accumulated tick count, so a laggy polling loop catches up and the
/// cadence cannot drift. Cancellation is dropping the handle; a dropped
/// schedule can never report another fire.
#[derive(Debug, Clone)]
pub struct Schedule {
    anchor: Instant,
    period: Duration,
    delivered: u64,
}

impl Schedule {
    /// Panics if `period` is zero; both cadences in this program are fixed
    /// non-zero constants.
    pub fn new(anchor: Instant, period: Duration) -> Self {
        assert!(!period.is_zero(), "schedule period must be non-zero");
        Self {
            anchor,
            period,
            delivered: 0,
        }
    }

    fn periods_elapsed(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.anchor);
        (elapsed.as_millis() / self.period.as_millis()) as u64
    }

    /// Number of fires that became due since the last call. Returns 0 when
    /// polled before the next period boundary and catches up in one call if
    /// several boundaries passed.
    pub fn fire(&mut self, now: Instant) -> u32 {
        let due = self.periods_elapsed(now);
        let fresh = due.saturating_sub(self.delivered);
        self.delivered = due;
        fresh as u32
    }
}
