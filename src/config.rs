//! Configuration Module
//!
//! Loads server configuration from command line flags, falling back to
//! environment variables and then to built-in defaults.

use std::time::Duration;

use clap::Parser;

use crate::error::{CacheError, Result};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8182;
/// Default maximum number of cache entries.
pub const DEFAULT_CACHE_SIZE: usize = 1000;
/// Default action queue depth.
pub const DEFAULT_CONN_LIMIT: usize = 50;
/// Default interval between expiry sweeps, in milliseconds.
pub const DEFAULT_REAP_INTERVAL_MS: u64 = 1000;
/// Largest accepted cache size.
pub const MAX_CACHE_SIZE: usize = usize::MAX >> 1;
/// Largest accepted action queue depth.
pub const MAX_CONN_LIMIT: usize = u16::MAX as usize;

/// Server configuration parameters.
#[derive(Debug, Clone, Parser)]
#[command(name = "ttl_lru", version, about = "In-memory LRU cache server with per-entry TTL")]
pub struct Config {
    /// Port to present the HTTP API on
    #[arg(long, env = "TTL_LRU_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum number of records allowed in the cache
    #[arg(long = "cachesize", env = "TTL_LRU_CACHE_SIZE", default_value_t = DEFAULT_CACHE_SIZE)]
    pub cache_size: usize,

    /// Maximum number of pending cache actions; further requests get 429
    #[arg(long = "connlimit", env = "TTL_LRU_CONN_LIMIT", default_value_t = DEFAULT_CONN_LIMIT)]
    pub conn_limit: usize,

    /// Interval between expired-entry sweeps in milliseconds (0 disables sweeping)
    #[arg(long, env = "TTL_LRU_REAP_INTERVAL_MS", default_value_t = DEFAULT_REAP_INTERVAL_MS)]
    pub reap_interval_ms: u64,
}

impl Config {
    /// Checks that every limit is strictly positive and within its maximum.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(CacheError::Config(format!(
                "port must be: 0 < port <= {}",
                u16::MAX
            )));
        }
        if self.cache_size == 0 || self.cache_size > MAX_CACHE_SIZE {
            return Err(CacheError::Config(format!(
                "cachesize must be: 0 < cachesize <= {}",
                MAX_CACHE_SIZE
            )));
        }
        if self.conn_limit == 0 || self.conn_limit > MAX_CONN_LIMIT {
            return Err(CacheError::Config(format!(
                "connlimit must be: 0 < connlimit <= {}",
                MAX_CONN_LIMIT
            )));
        }
        Ok(())
    }

    /// Sweep interval, or `None` when sweeping is disabled.
    pub fn reap_interval(&self) -> Option<Duration> {
        match self.reap_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cache_size: DEFAULT_CACHE_SIZE,
            conn_limit: DEFAULT_CONN_LIMIT,
            reap_interval_ms: DEFAULT_REAP_INTERVAL_MS,
        }
    }
}
