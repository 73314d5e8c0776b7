//! ttl_lru - A bounded in-memory cache server
//!
//! An LRU cache with per-entry TTL, served over HTTP. Every cache operation
//! is funnelled through a bounded action queue drained by a single consumer;
//! when the queue is full, requests are rejected instead of waiting.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod server;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, LruCache};
pub use client::CacheClient;
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{CacheError, Result};
pub use server::{Lifecycle, Server};
pub use tasks::spawn_reaper_task;
