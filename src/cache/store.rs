//! Cache Store Module
//!
//! Main cache engine combining the key index, the recency list and the
//! expiry queue.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::cache::{
    CacheEntry, CacheStats, ExpiryQueue, RecencyList, ScheduledExpiry, PREALLOCATED_SLOTS,
};
use crate::error::{CacheError, Result};

/// Cache engine as used by the HTTP server.
pub type CacheStore = LruCache<String, serde_json::Value>;

// == LRU Cache ==
/// Bounded key-value cache with LRU eviction and per-entry TTL.
///
/// The engine does no locking of its own. It is meant to be owned by a
/// single task (see [`crate::dispatch`]); every method that changes the
/// topology takes `&mut self`.
///
/// Expiration is lazy. An entry past its deadline is never returned by
/// [`get`](Self::get), but it keeps its slot until [`expunge`](Self::expunge)
/// runs or it falls off the tail under capacity pressure. Until then
/// [`has`](Self::has) and [`len`](Self::len) still count it.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Entries in recency order
    list: RecencyList<CacheEntry<K, V>>,
    /// Key to slot in `list`
    index: HashMap<K, usize>,
    /// Pending deadlines
    expiry: ExpiryQueue,
    /// Performance statistics
    stats: CacheStats,
    next_generation: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns `CacheError::Config` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::Config(
                "cache capacity must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            list: RecencyList::with_capacity(capacity),
            index: HashMap::with_capacity(capacity.min(PREALLOCATED_SLOTS)),
            expiry: ExpiryQueue::new(),
            stats: CacheStats::new(capacity),
            next_generation: 0,
        })
    }

    // == Has ==
    /// Returns true if the key occupies a slot, tombstones included.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Get ==
    /// Returns the value for a live key and promotes it to most recently used.
    ///
    /// An entry found past its deadline is tombstoned in place and reported
    /// as a miss; it is not unlinked.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };
        let entry = self.list.get_mut(idx)?;

        match entry.value(now).cloned() {
            Some(value) => {
                self.list.move_to_front(idx);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                entry.expire();
                self.stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Inserts or replaces a value.
    ///
    /// Replacing restarts the TTL and promotes the key. Inserting a new key
    /// into a full cache first evicts the least recently used entry, whether
    /// or not that entry has expired.
    pub fn put(&mut self, key: K, value: V, ttl: Duration) {
        let now = Instant::now();
        let generation = self.next_generation();

        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(idx) {
                entry.replace(value, ttl, now, generation);
                let at = entry.deadline();
                self.list.move_to_front(idx);
                self.expiry.schedule(at, idx, generation);
                self.compact_expiry();
                return;
            }
        }

        if self.list.is_full() {
            self.evict_lru();
        }

        let entry = CacheEntry::new(key.clone(), value, ttl, now, generation);
        let at = entry.deadline();
        let Ok(idx) = self.list.push_front(entry) else {
            unreachable!("recency list still full after eviction");
        };
        self.index.insert(key, idx);
        self.expiry.schedule(at, idx, generation);
        self.compact_expiry();
        self.stats.set_total_entries(self.list.len());
    }

    // == Remove ==
    /// Unlinks a key and returns its value if it was still live.
    ///
    /// The entry's pending expiry is invalidated along with it.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        let entry = self.list.remove(idx)?;
        self.stats.set_total_entries(self.list.len());

        if entry.is_live(Instant::now()) {
            entry.into_value()
        } else {
            None
        }
    }

    // == Length ==
    /// Number of occupied slots, tombstones included.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.list.capacity()
    }

    // == Expunge ==
    /// Reclaims every entry whose deadline has passed.
    ///
    /// Live entries keep their values and relative order. Returns the number
    /// of entries removed.
    pub fn expunge(&mut self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        while let Some(due) = self.expiry.pop_due(now) {
            let current = self
                .list
                .get(due.slot)
                .is_some_and(|entry| entry.generation() == due.generation);
            if !current {
                continue;
            }
            if let Some(entry) = self.list.remove(due.slot) {
                self.index.remove(entry.key());
                removed += 1;
            }
        }

        self.stats.record_expired(removed);
        self.stats.set_total_entries(self.list.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.list.len());
        stats
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn evict_lru(&mut self) {
        let Some(tail) = self.list.back() else {
            return;
        };
        if let Some(entry) = self.list.remove(tail) {
            self.index.remove(entry.key());
            self.stats.record_eviction();
        }
    }

    /// Drops stale expiry records once they outnumber the slots two to one.
    fn compact_expiry(&mut self) {
        if self.expiry.len() <= self.capacity().saturating_mul(2) {
            return;
        }
        self.expiry
            .rebuild(self.list.iter().map(|(slot, entry)| ScheduledExpiry {
                at: entry.deadline(),
                slot,
                generation: entry.generation(),
            }));
    }

    /// Index and recency list agree on every key, and the list is within capacity.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        if self.index.len() != self.list.len() || self.list.len() > self.capacity() {
            return false;
        }
        if self.list.iter().count() != self.list.len() {
            return false;
        }
        self.index.iter().all(|(key, &idx)| {
            self.list
                .get(idx)
                .is_some_and(|entry| entry.key() == key)
        })
    }

    #[cfg(test)]
    pub(crate) fn expiry_backlog(&self) -> usize {
        self.expiry.len()
    }
}
