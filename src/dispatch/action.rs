//! Pending cache actions.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;

use crate::cache::{CacheStats, CacheStore};

// == Action ==
/// A request against the cache plus the channel its result goes back on.
///
/// Actions carry domain data only. They are built by producers, applied
/// once by the dispatcher's consumer, then dropped.
#[derive(Debug)]
pub enum Action {
    Get {
        key: String,
        respond_to: oneshot::Sender<Option<Value>>,
    },
    Put {
        key: String,
        value: Value,
        ttl: Duration,
        respond_to: oneshot::Sender<()>,
    },
    Remove {
        key: String,
        respond_to: oneshot::Sender<Option<Value>>,
    },
    Expunge {
        respond_to: oneshot::Sender<usize>,
    },
    Stats {
        respond_to: oneshot::Sender<CacheStats>,
    },
}

impl Action {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Get { .. } => "get",
            Action::Put { .. } => "put",
            Action::Remove { .. } => "remove",
            Action::Expunge { .. } => "expunge",
            Action::Stats { .. } => "stats",
        }
    }

    // == Apply ==
    /// Runs the action against the cache and hands the result back.
    ///
    /// A producer that stopped waiting is not an error; its result is dropped.
    pub fn apply(self, cache: &mut CacheStore) {
        match self {
            Action::Get { key, respond_to } => {
                let _ = respond_to.send(cache.get(&key));
            }
            Action::Put {
                key,
                value,
                ttl,
                respond_to,
            } => {
                cache.put(key, value, ttl);
                let _ = respond_to.send(());
            }
            Action::Remove { key, respond_to } => {
                let _ = respond_to.send(cache.remove(&key));
            }
            Action::Expunge { respond_to } => {
                let _ = respond_to.send(cache.expunge());
            }
            Action::Stats { respond_to } => {
                let _ = respond_to.send(cache.stats());
            }
        }
    }
}
