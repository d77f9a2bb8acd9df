use std::time::{Duration, Instant};

const TIMER_DEC_PER_SECOND: u64 = 60;

/// One 60Hz tick.
pub const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / TIMER_DEC_PER_SECOND);

/// An 8-bit countdown that drops by one every `TIMER_PERIOD` of wall-clock
/// time, however fast the CPU is running.
#[derive(Debug)]
pub struct Timer {
    pub count: u8,
    origin: Instant,
}

impl Timer {
    pub fn new(init_count: u8, now: Instant) -> Self {
        Self {
            count: init_count,
            origin: now,
        }
    }

    /// Loads the timer and restarts its 60Hz reference at `now`.
    pub fn set(&mut self, value: u8, now: Instant) {
        self.count = value;
        self.origin = now;
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }

    /// Decrements at most once. The reference moves forward by exactly one
    /// period rather than jumping to `now`, so late syncs don't accumulate
    /// drift.
    pub fn sync(&mut self, now: Instant) -> bool {
        if self.count == 0 {
            return false;
        }
        if now.saturating_duration_since(self.origin) >= TIMER_PERIOD {
            // past deadline
            self.origin += TIMER_PERIOD;
            self.count -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_once_per_period() {
        let t0 = Instant::now();
        let mut timer = Timer::new(0, t0);
        timer.set(10, t0);

        for tick in 1..=10u32 {
            assert!(timer.sync(t0 + TIMER_PERIOD * tick));
            assert_eq!(timer.count, 10 - tick as u8);
        }
        assert!(!timer.sync(t0 + TIMER_PERIOD * 11));
        assert_eq!(timer.count, 0);
    }

    #[test]
    fn holds_before_a_full_period() {
        let t0 = Instant::now();
        let mut timer = Timer::new(3, t0);
        assert!(!timer.sync(t0 + TIMER_PERIOD - Duration::from_nanos(1)));
        assert_eq!(timer.count, 3);
    }

    #[test]
    fn catches_up_one_tick_per_sync_without_drift() {
        let t0 = Instant::now();
        let mut timer = Timer::new(5, t0);
        // a stall of 2.5 periods, then repeated syncs at the same instant
        let late = t0 + TIMER_PERIOD * 5 / 2;
        assert!(timer.sync(late));
        assert!(timer.sync(late));
        assert!(!timer.sync(late));
        assert_eq!(timer.count, 3);
        // the next tick is due at 3 periods, not 3.5
        assert!(timer.sync(t0 + TIMER_PERIOD * 3));
        assert_eq!(timer.count, 2);
    }

    #[test]
    fn zero_stays_zero() {
        let t0 = Instant::now();
        let mut timer = Timer::new(0, t0);
        assert!(!timer.sync(t0 + TIMER_PERIOD * 100));
        assert_eq!(timer.count, 0);
        assert!(!timer.is_active());
    }
}
