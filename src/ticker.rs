//! Fixed-cadence scheduling for the game loop.

use std::time::{Duration, Instant};

/// Tick-if-due gate. Each call to [`due`](Ticker::due) reports whether at
/// least one interval has elapsed since the last executed tick; when it has,
/// the remainder (elapsed modulo interval) carries over so the cadence does
/// not drift. At most one tick is consumed per call.
pub struct Ticker {
    interval: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Ticker {
            interval,
            last: Instant::now(),
        }
    }

    /// Re-arm after a pause so the next run doesn't burst stale ticks.
    pub fn rearm(&mut self) {
        self.last = Instant::now();
    }

    pub fn due(&mut self) -> bool {
        let elapsed = self.last.elapsed();
        if elapsed < self.interval {
            return false;
        }
        let carry =
            Duration::from_nanos((elapsed.as_nanos() % self.interval.as_nanos()) as u64);
        self.last = Instant::now() - carry;
        true
    }

    /// How long until the next tick is due; zero when already due.
    pub fn until_due(&self) -> Duration {
        self.interval.saturating_sub(self.last.elapsed())
    }
}
