//! Expiry Queue Module
//!
//! Deadline-ordered min-heap standing in for a timer per entry.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

// == Scheduled Expiry ==
/// One pending expiry: entry `generation` in `slot` dies at `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScheduledExpiry {
    pub at: Instant,
    pub slot: usize,
    pub generation: u64,
}

// == Expiry Queue ==
/// Pending expiries ordered by deadline, earliest first.
///
/// Records are never removed when their entry is replaced or removed.
/// Instead the consumer compares the record's generation with the entry
/// currently in the slot and drops the record on mismatch, so a stale
/// expiry can never touch a newer entry.
#[derive(Debug, Default)]
pub struct ExpiryQueue {
    heap: BinaryHeap<Reverse<ScheduledExpiry>>,
}

impl ExpiryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // == Schedule ==
    pub fn schedule(&mut self, at: Instant, slot: usize, generation: u64) {
        self.heap.push(Reverse(ScheduledExpiry {
            at,
            slot,
            generation,
        }));
    }

    // == Pop Due ==
    /// Removes and returns the earliest record whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<ScheduledExpiry> {
        match self.heap.peek() {
            Some(Reverse(next)) if next.at <= now => self.heap.pop().map(|Reverse(due)| due),
            _ => None,
        }
    }

    // == Rebuild ==
    /// Replaces every record, discarding stale ones in the process.
    pub fn rebuild<I>(&mut self, current: I)
    where
        I: IntoIterator<Item = ScheduledExpiry>,
    {
        self.heap = current.into_iter().map(Reverse).collect();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
