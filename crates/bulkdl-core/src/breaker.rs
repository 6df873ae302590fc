//! Per-worker consecutive-failure circuit breaker.
//!
//! Each pool worker owns one breaker; a burst of failures on one worker never
//! pauses another. Globally the system tolerates up to
//! `tolerance × num_workers` consecutive failures before every worker is
//! cooling at once.

use std::thread;
use std::time::Duration;

#[derive(Debug)]
pub struct ErrorBreaker {
    tolerance: u32,
    cooldown: Duration,
    consecutive: u32,
    trips: u32,
}

impl ErrorBreaker {
    pub fn new(tolerance: u32, cooldown: Duration) -> Self {
        Self {
            tolerance: tolerance.max(1),
            cooldown,
            consecutive: 0,
            trips: 0,
        }
    }

    /// Any success clears the streak.
    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    /// Counts one failure. When the streak reaches the tolerance the calling
    /// worker blocks for the cooldown, the counter resets, and `true` is
    /// returned so the caller can report the trip.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive += 1;
        if self.consecutive < self.tolerance {
            return false;
        }
        self.consecutive = 0;
        self.trips += 1;
        if !self.cooldown.is_zero() {
            thread::sleep(self.cooldown);
        }
        true
    }

    /// Number of cooldowns taken so far.
    pub fn trips(&self) -> u32 {
        self.trips
    }
}
