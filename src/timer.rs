//! Tick-driven countdown and elapsed counters.
//!
//! Both advance by exactly one second per `tick()`. Who calls `tick()` (a
//! tokio interval in `runtime`, or a test loop) is not their concern.

use serde::{Deserialize, Serialize};

/// Countdown between consecutive sets of one exercise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestTimer {
    remaining: u32,
    active: bool,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a countdown. A zero-second rest never becomes active.
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.active = seconds > 0;
    }

    /// Advances one second. Returns `true` when this tick ran the countdown out.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Stops the countdown at whatever value it had.
    pub fn cancel(&mut self) {
        self.active = false;
        self.remaining = 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Seconds left; zero whenever the timer is inactive.
    pub fn remaining(&self) -> u32 {
        if self.active { self.remaining } else { 0 }
    }
}

/// Free-running session duration counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClock {
    elapsed: u64,
    running: bool,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn tick(&mut self) {
        if self.running {
            self.elapsed += 1;
        }
    }

    /// Freezes the counter for good.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_counts_down_and_deactivates() {
        let mut rest = RestTimer::new();
        rest.start(3);
        assert!(rest.is_active());
        assert!(!rest.tick());
        assert!(!rest.tick());
        assert_eq!(rest.remaining(), 1);
        assert!(rest.tick());
        assert!(!rest.is_active());
        assert_eq!(rest.remaining(), 0);
        // further ticks are inert
        assert!(!rest.tick());
    }

    #[test]
    fn test_rest_zero_seconds_never_activates() {
        let mut rest = RestTimer::new();
        rest.start(0);
        assert!(!rest.is_active());
    }

    #[test]
    fn test_rest_cancel() {
        let mut rest = RestTimer::new();
        rest.start(90);
        rest.tick();
        rest.cancel();
        assert!(!rest.is_active());
        assert_eq!(rest.remaining(), 0);
    }

    #[test]
    fn test_clock() {
        let mut clock = SessionClock::new();
        clock.tick();
        assert_eq!(clock.elapsed(), 0);

        clock.start();
        for _ in 0..5 {
            clock.tick();
        }
        clock.stop();
        clock.tick();
        assert_eq!(clock.elapsed(), 5);
        assert!(!clock.is_running());
    }
}
