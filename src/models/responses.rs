//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies. A cache hit is
//! answered with the stored JSON value itself, so it has no wrapper here.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::dispatch::QueueStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Number of expired entries reclaimed
    pub expired: u64,
    /// Current number of entries in cache, unreclaimed tombstones included
    pub total_entries: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// Actions accepted into the queue
    pub accepted: u64,
    /// Actions rejected because the queue was full
    pub rejected: u64,
    /// Actions waiting in the queue
    pub pending: usize,
    /// Action queue depth
    pub queue_capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Combines engine statistics with the dispatcher's queue counters
    pub fn new(stats: CacheStats, queue: QueueStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expired: stats.expired,
            total_entries: stats.total_entries,
            capacity: stats.capacity,
            accepted: queue.accepted,
            rejected: queue.rejected,
            pending: queue.pending,
            queue_capacity: queue.capacity,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
