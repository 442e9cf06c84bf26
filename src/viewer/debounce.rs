//! Debounce timer driven by the host's clock
//!
//! Triggering arms (or re-arms) a deadline; polling fires once the deadline
//! has passed. A burst of triggers collapses into a single firing after the
//! last one settles.

use std::time::{Duration, Instant};

/// Quiet period after the last scroll before the render window is recomputed
pub const SETTLE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm the timer relative to now
    pub fn trigger(&mut self) {
        self.trigger_at(Instant::now());
    }

    /// Arm the timer relative to `now`, pushing back any pending deadline
    pub fn trigger_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns true exactly once per armed deadline, when `now` has reached it
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the deadline, if armed
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SETTLE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(100));
        debounce.trigger_at(start);

        assert!(!debounce.poll(start + Duration::from_millis(99)));
        assert!(debounce.poll(start + Duration::from_millis(100)));
        assert!(!debounce.poll(start + Duration::from_millis(500)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn burst_collapses_into_one_firing() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(100));

        for step in 0..10 {
            debounce.trigger_at(start + Duration::from_millis(step * 50));
            assert!(!debounce.poll(start + Duration::from_millis(step * 50 + 10)));
        }

        // Last trigger at 450ms
        assert!(!debounce.poll(start + Duration::from_millis(549)));
        assert!(debounce.poll(start + Duration::from_millis(550)));
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(10));
        debounce.trigger_at(start);
        debounce.cancel();
        assert!(!debounce.poll(start + Duration::from_secs(1)));
    }

    #[test]
    fn remaining_counts_down() {
        let start = Instant::now();
        let mut debounce = Debouncer::default();
        assert_eq!(debounce.remaining(start), None);
        debounce.trigger_at(start);
        assert_eq!(
            debounce.remaining(start + Duration::from_millis(400)),
            Some(Duration::from_millis(600))
        );
    }
}
