//! Trailing-edge debouncer.
//!
//! Every [`call_at`](Debouncer::call_at) pushes the deadline out to
//! `now + interval`. The debouncer fires once, on the first
//! [`poll_at`](Debouncer::poll_at) at or after the deadline, so a burst of
//! calls closer together than `interval` collapses into a single firing.
//!
//! The caller supplies the clock, so behavior is deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Record a triggering event at `now`, resetting any pending deadline.
    pub fn call_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Returns `true` exactly once per quiet period, when the deadline has
    /// passed.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
