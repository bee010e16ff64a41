//! Cache Entry Module
//!
//! Defines a single cached value together with its last-access timestamp.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A stored value and the instant it was last read or written.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Last time the entry was returned by `get` or written by `set`
    pub last_accessed: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: V) -> Self {
        Self {
            value,
            last_accessed: Instant::now(),
        }
    }

    // == Touch ==
    /// Refreshes the last-access timestamp.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    // == Replace ==
    /// Swaps in a new value, refreshes the timestamp and returns the old value.
    pub fn replace(&mut self, value: V) -> V {
        self.touch();
        std::mem::replace(&mut self.value, value)
    }

    // == Idle Time ==
    /// Returns how long the entry has gone without being accessed, measured at `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_accessed)
    }

    // == Is Idle ==
    /// Checks whether the entry has been idle for strictly longer than `ttl`.
    ///
    /// An entry idle for exactly `ttl` is still live; it goes on the next sweep.
    pub fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        self.idle_for(now) > ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("tt0111161".to_string());

        assert_eq!(entry.value, "tt0111161");
        assert!(!entry.is_idle(Instant::now(), Duration::from_secs(60)));
    }

    #[test]
    fn test_entry_becomes_idle() {
        let entry = CacheEntry::new(1);

        sleep(Duration::from_millis(20));

        assert!(entry.is_idle(Instant::now(), Duration::from_millis(5)));
        assert!(!entry.is_idle(Instant::now(), Duration::from_secs(60)));
    }

    #[test]
    fn test_touch_resets_idle_time() {
        let mut entry = CacheEntry::new(1);
        sleep(Duration::from_millis(20));

        entry.touch();

        assert!(entry.idle_for(Instant::now()) < Duration::from_millis(20));
    }

    #[test]
    fn test_replace_returns_previous_value() {
        let mut entry = CacheEntry::new("old");
        let before = entry.last_accessed;

        sleep(Duration::from_millis(2));
        let previous = entry.replace("new");

        assert_eq!(previous, "old");
        assert_eq!(entry.value, "new");
        assert!(entry.last_accessed > before);
    }

    #[test]
    fn test_idle_boundary_is_exclusive() {
        let entry = CacheEntry::new(());
        let now = entry.last_accessed + Duration::from_millis(10);

        // Exactly at the TTL the entry is still live
        assert!(!entry.is_idle(now, Duration::from_millis(10)));
        assert!(entry.is_idle(now, Duration::from_millis(9)));
    }

    #[test]
    fn test_idle_for_clock_before_access() {
        let entry = CacheEntry::new(());
        let earlier = entry.last_accessed - Duration::from_millis(1);

        assert_eq!(entry.idle_for(earlier), Duration::ZERO);
    }
}
