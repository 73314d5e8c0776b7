//! Cache Module
//!
//! Provides the in-memory cache engine with TTL expiration and LRU eviction.

mod entry;
mod expiry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use expiry::{ExpiryQueue, ScheduledExpiry};
pub use lru::RecencyList;
pub use stats::CacheStats;
pub use store::{CacheStore, LruCache};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Slots reserved up front; larger caches allocate as they fill
pub(crate) const PREALLOCATED_SLOTS: usize = 1 << 16;
