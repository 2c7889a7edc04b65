//! Fixed-delay tick scheduling
//!
//! Each deadline is the previous wake time plus the interval, so the time
//! spent processing a tick does not push later ticks back. When a tick
//! overruns its deadline the clock re-anchors at the current time instead of
//! firing a burst of catch-up ticks.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TickClock {
    interval: Duration,
    last_wake: Instant,
}

impl TickClock {
    /// Start counting from `now`
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            last_wake: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_deadline(&self) -> Instant {
        self.last_wake + self.interval
    }

    /// Advance to the next tick as seen at `now`
    ///
    /// # Returns
    /// How long to sleep before the tick fires (zero after an overrun)
    pub fn advance(&mut self, now: Instant) -> Duration {
        let deadline = self.next_deadline();
        if deadline > now {
            self.last_wake = deadline;
            deadline - now
        } else {
            self.last_wake = now;
            Duration::ZERO
        }
    }

    /// Block the calling thread until the next tick
    pub fn wait(&mut self) {
        let delay = self.advance(Instant::now());
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
