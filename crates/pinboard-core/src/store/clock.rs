//! Monotonic millisecond timestamps for `createdAt`/`updatedAt`.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Strictly increasing stamps, even when the wall clock stalls or steps back.
#[derive(Debug, Clone, Default)]
pub(crate) struct Clock {
    last: u64,
}

impl Clock {
    pub(crate) fn now(&mut self) -> u64 {
        let next = wall_clock_ms().max(self.last + 1);
        self.last = next;
        next
    }

    /// Account for a stamp produced elsewhere (imports, remote records).
    pub(crate) fn observe(&mut self, stamp: u64) {
        self.last = self.last.max(stamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamps_strictly_increase() {
        let mut clock = Clock::default();
        let a = clock.now();
        let b = clock.now();
        let c = clock.now();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_observe_future_stamp() {
        let mut clock = Clock::default();
        let future = wall_clock_ms() + 1_000_000;
        clock.observe(future);
        assert!(clock.now() > future);
    }
}
