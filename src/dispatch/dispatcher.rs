//! Action Dispatcher
//!
//! Bounded action queue with a single consumer that owns the cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinHandle;
use tracing::{info, trace};

use crate::cache::{CacheStats, CacheStore};
use crate::dispatch::Action;
use crate::error::{CacheError, Result};

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    rejected: AtomicU64,
}

/// Point-in-time view of the action queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub accepted: u64,
    pub rejected: u64,
    pub pending: usize,
    pub capacity: usize,
}

// == Dispatcher ==
/// Producer handle for the action queue.
///
/// Cloning is cheap; every clone feeds the same queue. Enqueueing never
/// waits: a full queue is reported as [`CacheError::QueueFull`] right away.
/// Once every handle is dropped the consumer finishes its backlog and stops.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<Action>,
    counters: Arc<Counters>,
}

/// Consumer half of the queue. Owns the cache for its whole lifetime.
#[derive(Debug)]
pub struct ActionConsumer {
    rx: mpsc::Receiver<Action>,
    cache: CacheStore,
}

impl Dispatcher {
    // == Constructor ==
    /// Creates a queue of `queue_size` slots in front of `cache`.
    ///
    /// The consumer is returned unstarted; see [`Dispatcher::spawn`].
    ///
    /// # Errors
    /// Returns `CacheError::Config` if `queue_size` is zero or larger than
    /// a tokio channel can hold.
    pub fn new(cache: CacheStore, queue_size: usize) -> Result<(Self, ActionConsumer)> {
        if queue_size == 0 || queue_size > Semaphore::MAX_PERMITS {
            return Err(CacheError::Config(format!(
                "action queue size must be: 0 < size <= {}",
                Semaphore::MAX_PERMITS
            )));
        }

        let (tx, rx) = mpsc::channel(queue_size);
        let dispatcher = Self {
            tx,
            counters: Arc::new(Counters::default()),
        };
        Ok((dispatcher, ActionConsumer { rx, cache }))
    }

    /// Creates the queue and runs its consumer on the tokio runtime.
    ///
    /// The join handle yields the cache back once the consumer stops.
    pub fn spawn(cache: CacheStore, queue_size: usize) -> Result<(Self, JoinHandle<CacheStore>)> {
        let (dispatcher, consumer) = Self::new(cache, queue_size)?;
        Ok((dispatcher, tokio::spawn(consumer.run())))
    }

    // == Enqueue ==
    /// Offers an action to the queue without waiting.
    pub fn enqueue(&self, action: Action) -> Result<()> {
        match self.tx.try_send(action) {
            Ok(()) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(action)) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                trace!(kind = action.kind(), "action queue full, rejecting");
                Err(CacheError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(CacheError::DispatcherClosed),
        }
    }

    pub async fn get(&self, key: impl Into<String>) -> Result<Option<Value>> {
        let key = key.into();
        self.request(|respond_to| Action::Get { key, respond_to })
            .await
    }

    pub async fn put(&self, key: impl Into<String>, value: Value, ttl: Duration) -> Result<()> {
        let key = key.into();
        self.request(|respond_to| Action::Put {
            key,
            value,
            ttl,
            respond_to,
        })
        .await
    }

    pub async fn remove(&self, key: impl Into<String>) -> Result<Option<Value>> {
        let key = key.into();
        self.request(|respond_to| Action::Remove { key, respond_to })
            .await
    }

    pub async fn expunge(&self) -> Result<usize> {
        self.request(|respond_to| Action::Expunge { respond_to })
            .await
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        self.request(|respond_to| Action::Stats { respond_to })
            .await
    }

    /// Number of actions accepted into the queue so far.
    pub fn accepted(&self) -> u64 {
        self.counters.accepted.load(Ordering::Relaxed)
    }

    /// Number of actions turned away because the queue was full.
    pub fn rejected(&self) -> u64 {
        self.counters.rejected.load(Ordering::Relaxed)
    }

    /// Configured queue depth.
    pub fn queue_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Actions currently waiting in the queue.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn queue_stats(&self) -> QueueStats {
        QueueStats {
            accepted: self.accepted(),
            rejected: self.rejected(),
            pending: self.pending(),
            capacity: self.queue_capacity(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Action) -> Result<T> {
        let (respond_to, response) = oneshot::channel();
        self.enqueue(build(respond_to))?;
        response.await.map_err(|_| CacheError::DispatcherClosed)
    }
}

impl ActionConsumer {
    // == Run ==
    /// Applies queued actions one at a time, in arrival order, until every
    /// producer handle is gone. Returns the cache afterwards.
    pub async fn run(mut self) -> CacheStore {
        info!(
            capacity = self.cache.capacity(),
            "action dispatcher started"
        );

        while let Some(action) = self.rx.recv().await {
            trace!(kind = action.kind(), "applying action");
            action.apply(&mut self.cache);
        }

        info!(entries = self.cache.len(), "action dispatcher stopped");
        self.cache
    }
}
