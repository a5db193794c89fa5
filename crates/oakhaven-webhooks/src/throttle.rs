//! Per-key rate limiting for webhook dispatch.
//!
//! Some events fire far more often than a subscriber should be woken for --
//! undirected speech and health-critical warnings in particular. [`Throttle`]
//! tracks, per opaque key, the world-seconds timestamp of the last allowed
//! firing and refuses a repeat within the configured interval.

use std::collections::HashMap;

/// Tracks the last-fired time per key and enforces a minimum interval between firings.
#[derive(Debug, Default)]
pub struct Throttle {
    interval_seconds: u64,
    last_fired: HashMap<String, u64>,
}

impl Throttle {
    /// Create a throttle requiring at least `interval_seconds` between
    /// allowed firings of the same key.
    #[must_use]
    pub fn new(interval_seconds: u64) -> Self {
        Self {
            interval_seconds,
            last_fired: HashMap::new(),
        }
    }

    /// Check whether `key` may fire at `world_seconds`, recording the
    /// firing if so.
    ///
    /// Returns `true` the first time a key is seen, and thereafter at most
    /// once per `interval_seconds` of world time.
    pub fn allow(&mut self, key: &str, world_seconds: u64) -> bool {
        match self.last_fired.get(key) {
            Some(&last) if world_seconds.saturating_sub(last) < self.interval_seconds => false,
            _ => {
                self.last_fired.insert(key.to_owned(), world_seconds);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_firing_always_allowed() {
        let mut throttle = Throttle::new(10);
        assert!(throttle.allow("alice:health", 0));
    }

    #[test]
    fn repeat_within_interval_is_denied() {
        let mut throttle = Throttle::new(10);
        assert!(throttle.allow("alice:health", 100));
        assert!(!throttle.allow("alice:health", 105));
    }

    #[test]
    fn repeat_after_interval_is_allowed() {
        let mut throttle = Throttle::new(10);
        assert!(throttle.allow("alice:health", 100));
        assert!(throttle.allow("alice:health", 111));
    }

    #[test]
    fn distinct_keys_are_independent() {
        let mut throttle = Throttle::new(10);
        assert!(throttle.allow("alice:health", 100));
        assert!(throttle.allow("bob:health", 101));
    }
}
