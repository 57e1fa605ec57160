//! Cancellable one-shot deadlines.
//!
//! The codec never spawns timer tasks. It records deadlines here and the
//! event task sleeps until the nearest one (see [`crate::task`]).

use embassy_time::{Duration, Instant};

/// A single pending deadline. Arming replaces any earlier deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShot {
    deadline: Option<Instant>,
}

impl OneShot {
    /// A disarmed timer.
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Fire `after` from `now`.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now.checked_add(after).unwrap_or(Instant::MAX));
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Pending deadline.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `true` while a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return `true` if the deadline is at or before `now`.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// The earlier of two optional deadlines.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn rearming_replaces_the_deadline() {
        let t0 = Instant::from_millis(1_000);
        let mut timer = OneShot::new();

        timer.arm(t0, Duration::from_secs(60));
        timer.arm(t0, Duration::from_secs(20));

        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(20)));
    }

    #[test]
    fn take_expired_fires_once() {
        let t0 = Instant::from_millis(0);
        let mut timer = OneShot::new();
        timer.arm(t0, Duration::from_secs(4));

        assert!(!timer.take_expired(t0 + Duration::from_secs(3)));
        assert!(timer.take_expired(t0 + Duration::from_secs(4)));
        assert!(!timer.take_expired(t0 + Duration::from_secs(5)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn cancel_disarms() {
        let mut timer = OneShot::new();
        timer.arm(Instant::from_millis(0), Duration::from_millis(10));
        timer.cancel();
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn earliest_picks_the_sooner_deadline() {
        let a = Some(Instant::from_millis(5));
        let b = Some(Instant::from_millis(3));
        assert_eq!(earliest(a, b), b);
        assert_eq!(earliest(a, None), a);
        assert_eq!(earliest(None, None), None);
    }
}
