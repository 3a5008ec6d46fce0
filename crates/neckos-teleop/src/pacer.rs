//! [`CommandPacer`] – combined de-duplication and rate limiter.
//!
//! A command goes to the transport only when it differs from the last
//! dispatched string AND the minimum interval has elapsed.  This is not a
//! queue: a command that loses the race is simply superseded by whatever is
//! synthesized next.

use std::time::{Duration, Instant};

/// Dispatch gate on the rendered wire string.
///
/// Time is passed in explicitly so the policy is testable without sleeping.
#[derive(Debug)]
pub struct CommandPacer {
    min_interval: Duration,
    last: Option<(String, Instant)>,
}

impl CommandPacer {
    /// Create a pacer with the given minimum dispatch interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Convenience constructor from milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Offer a rendered command for dispatch at time `now`.
    ///
    /// Returns the command when it should be sent; `None` when it is a
    /// duplicate of the last dispatched string or arrives inside the
    /// minimum interval.
    pub fn try_dispatch(&mut self, command: String, now: Instant) -> Option<String> {
        if let Some((last_cmd, last_at)) = &self.last {
            if *last_cmd == command {
                return None;
            }
            if now.duration_since(*last_at) < self.min_interval {
                return None;
            }
        }
        self.last = Some((command.clone(), now));
        Some(command)
    }

    /// The last string that actually went out, if any.
    pub fn last_dispatched(&self) -> Option<&str> {
        self.last.as_ref().map(|(cmd, _)| cmd.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_command_always_dispatches() {
        let mut pacer = CommandPacer::from_millis(85);
        let now = Instant::now();
        assert_eq!(
            pacer.try_dispatch("X1".to_string(), now),
            Some("X1".to_string())
        );
    }

    #[test]
    fn duplicate_is_never_dispatched_twice_in_a_row() {
        let mut pacer = CommandPacer::from_millis(85);
        let now = Instant::now();
        assert!(pacer.try_dispatch("X1".to_string(), now).is_some());
        // Same string again, inside the interval: suppressed.
        assert!(pacer.try_dispatch("X1".to_string(), now).is_none());
        // Same string well past the interval: still suppressed.
        let later = now + Duration::from_secs(5);
        assert!(pacer.try_dispatch("X1".to_string(), later).is_none());
    }

    #[test]
    fn changed_command_inside_interval_is_superseded() {
        let mut pacer = CommandPacer::from_millis(85);
        let now = Instant::now();
        assert!(pacer.try_dispatch("X1".to_string(), now).is_some());
        let soon = now + Duration::from_millis(10);
        assert!(pacer.try_dispatch("X2".to_string(), soon).is_none());
        // The suppressed X2 was not queued: after the interval, a new offer
        // is needed.
        let later = now + Duration::from_millis(90);
        assert_eq!(
            pacer.try_dispatch("X3".to_string(), later),
            Some("X3".to_string())
        );
        assert_eq!(pacer.last_dispatched(), Some("X3"));
    }

    #[test]
    fn changed_command_after_interval_dispatches() {
        let mut pacer = CommandPacer::from_millis(85);
        let now = Instant::now();
        pacer.try_dispatch("X1".to_string(), now);
        let later = now + Duration::from_millis(85);
        assert!(pacer.try_dispatch("X2".to_string(), later).is_some());
    }
}
