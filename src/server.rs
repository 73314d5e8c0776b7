//! Server Module
//!
//! Owns the listener and the serving lifecycle of the cache server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_reaper_task;

// == Lifecycle ==
/// Serving state of a [`Server`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    NotStarted = 0,
    Running = 1,
    Stopped = 2,
}

impl Lifecycle {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Lifecycle::NotStarted,
            1 => Lifecycle::Running,
            _ => Lifecycle::Stopped,
        }
    }
}

// == Server ==
/// Cache server bound to a socket, ready to serve exactly once.
pub struct Server {
    config: Config,
    local_addr: SocketAddr,
    listener: Mutex<Option<TcpListener>>,
    state: AtomicU8,
}

impl Server {
    // == Constructors ==
    /// Validates `config` and binds `0.0.0.0:<port>`.
    pub async fn bind(config: Config) -> Result<Self> {
        config.validate()?;
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await?;
        Self::from_listener(listener, config)
    }

    /// Wraps an already bound listener. The configured port is ignored.
    pub fn from_listener(listener: TcpListener, config: Config) -> Result<Self> {
        let config = Config {
            port: listener.local_addr()?.port(),
            ..config
        };
        config.validate()?;

        Ok(Self {
            local_addr: listener.local_addr()?,
            config,
            listener: Mutex::new(Some(listener)),
            state: AtomicU8::new(Lifecycle::NotStarted as u8),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.state.load(Ordering::Acquire))
    }

    // == Serve ==
    /// Serves HTTP until `shutdown` resolves.
    ///
    /// Only the first call does anything; later calls fail with
    /// `AlreadyRunning` while serving and `Stopped` afterwards. On shutdown
    /// the reaper is stopped and the dispatcher drains its queue before the
    /// server reports `Stopped`.
    pub async fn serve<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.state
            .compare_exchange(
                Lifecycle::NotStarted as u8,
                Lifecycle::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|current| match Lifecycle::from_u8(current) {
                Lifecycle::Stopped => CacheError::Stopped,
                _ => CacheError::AlreadyRunning,
            })?;

        let result = self.run(shutdown).await;
        self.state.store(Lifecycle::Stopped as u8, Ordering::Release);
        result
    }

    async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self
            .listener
            .lock()
            .await
            .take()
            .ok_or(CacheError::AlreadyRunning)?;

        let cache = CacheStore::new(self.config.cache_size)?;
        let (dispatcher, consumer) = Dispatcher::spawn(cache, self.config.conn_limit)?;
        info!(
            "Using cache size: {}, limiting pending actions to {}",
            self.config.cache_size, self.config.conn_limit
        );

        let reaper = self
            .config
            .reap_interval()
            .map(|interval| spawn_reaper_task(dispatcher.clone(), interval));

        let app = create_router(AppState::new(dispatcher));
        info!("Server listening on http://{}", self.local_addr);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Some(reaper) = reaper {
            reaper.abort();
            let _ = reaper.await;
        }

        match consumer.await {
            Ok(cache) => info!(entries = cache.len(), "cache released"),
            Err(err) => warn!("action dispatcher ended abnormally: {}", err),
        }

        served.map_err(CacheError::from)
    }
}
