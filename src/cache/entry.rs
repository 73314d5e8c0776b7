//! Cache Entry Module
//!
//! Defines a single cached record with its deadline and liveness state.

use std::time::{Duration, Instant};

/// Upper bound applied when `now + ttl` would overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

// == Cache Entry ==
/// A single cached record.
///
/// An entry is either live or a tombstone. Tombstones keep their slot (and
/// their key in the index) until they are reclaimed by `expunge` or evicted,
/// but their value has already been dropped.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    key: K,
    value: Option<V>,
    deadline: Instant,
    live: bool,
    generation: u64,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a live entry expiring `ttl` after `now`.
    pub fn new(key: K, value: V, ttl: Duration, now: Instant, generation: u64) -> Self {
        Self {
            key,
            value: Some(value),
            deadline: deadline_after(now, ttl),
            live: true,
            generation,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Absolute expiry instant.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Identifies this exact entry instance; bumped on every replacement.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // == Is Live ==
    /// True if the entry has not been tombstoned and its deadline is still ahead.
    ///
    /// Boundary condition: an entry whose deadline equals `now` is expired.
    pub fn is_live(&self, now: Instant) -> bool {
        self.live && now < self.deadline
    }

    /// Value of a live entry.
    pub fn value(&self, now: Instant) -> Option<&V> {
        if self.is_live(now) {
            self.value.as_ref()
        } else {
            None
        }
    }

    // == Expire ==
    /// Marks the entry dead and drops its value.
    ///
    /// Returns false if it was already a tombstone.
    pub fn expire(&mut self) -> bool {
        if !self.live {
            return false;
        }
        self.live = false;
        self.value = None;
        true
    }

    // == Replace ==
    /// Swaps in a new value, restarting the TTL countdown under a new generation.
    ///
    /// A tombstone that gets replaced becomes live again.
    pub fn replace(&mut self, value: V, ttl: Duration, now: Instant, generation: u64) {
        self.value = Some(value);
        self.deadline = deadline_after(now, ttl);
        self.live = true;
        self.generation = generation;
    }

    /// Consumes the entry, returning its value if it had not been tombstoned.
    pub fn into_value(self) -> Option<V> {
        self.value
    }
}

fn deadline_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let now = Instant::now();
        let entry = CacheEntry::new("k", "v", Duration::from_secs(60), now, 1);

        assert_eq!(*entry.key(), "k");
        assert_eq!(entry.value(now), Some(&"v"));
        assert!(entry.is_live(now));
        assert_eq!(entry.generation(), 1);
    }

    #[test]
    fn test_entry_expires_at_deadline() {
        let now = Instant::now();
        let entry = CacheEntry::new("k", "v", Duration::from_millis(10), now, 1);

        assert!(entry.is_live(now + Duration::from_millis(9)));
        assert!(!entry.is_live(now + Duration::from_millis(10)));
        assert_eq!(entry.value(now + Duration::from_millis(10)), None);
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let now = Instant::now();
        let entry = CacheEntry::new("k", "v", Duration::ZERO, now, 1);
        assert!(!entry.is_live(now));
    }

    #[test]
    fn test_expire_clears_value() {
        let now = Instant::now();
        let mut entry = CacheEntry::new("k", "v", Duration::from_secs(60), now, 1);

        assert!(entry.expire());
        assert!(!entry.is_live(now));
        assert!(entry.into_value().is_none());
    }

    #[test]
    fn test_expire_twice_is_noop() {
        let now = Instant::now();
        let mut entry = CacheEntry::new("k", "v", Duration::from_secs(60), now, 1);

        assert!(entry.expire());
        assert!(!entry.expire());
    }

    #[test]
    fn test_replace_revives_tombstone() {
        let now = Instant::now();
        let mut entry = CacheEntry::new("k", "old", Duration::from_millis(1), now, 1);
        entry.expire();

        entry.replace("new", Duration::from_secs(60), now, 2);

        assert!(entry.is_live(now));
        assert_eq!(entry.value(now), Some(&"new"));
        assert_eq!(entry.generation(), 2);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let now = Instant::now();
        let entry = CacheEntry::new("k", "v", Duration::MAX, now, 1);
        assert!(entry.is_live(now));
    }
}
