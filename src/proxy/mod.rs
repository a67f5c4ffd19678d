//! Proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher hands over a Connection
//!     → Proxy::handle (isolated task, tracing span)
//!     → session.rs (read request, cache, select backend, relay)
//!     → fingerprint.rs (cache key from the captured request)
//!     → outcome logged + counted; worker loops
//! ```
//!
//! # Design Decisions
//! - Pure byte relay; only the first request line is ever inspected
//! - A panicking session is contained in its own task
//! - Dropping the handle future aborts the session, releasing both sockets

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

use crate::cache::{self, ResponseCache};
use crate::config::{CacheKey, ProxyConfig, RelayMode};
use crate::load_balancer::{BackendPool, PoolError};
use crate::net::Connection;
use crate::observability::metrics;
use crate::resilience::Deadlines;

pub mod error;
pub mod fingerprint;
pub mod server;
pub mod session;

pub use error::{SessionError, Stage};
pub use server::ProxyServer;
pub use session::SessionOutcome;

/// Settings shared by every session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub buffer_size: usize,
    pub relay: RelayMode,
    pub cache_key: CacheKey,
    pub max_value_bytes: usize,
    pub deadlines: Deadlines,
}

impl From<&ProxyConfig> for SessionSettings {
    fn from(config: &ProxyConfig) -> Self {
        Self {
            buffer_size: config.session.buffer_size,
            relay: config.session.relay,
            cache_key: config.cache.key,
            max_value_bytes: config.cache.max_value_bytes,
            deadlines: Deadlines::from(&config.timeouts),
        }
    }
}

/// Everything a session needs: the backend pool, the cache, and settings.
#[derive(Debug)]
pub struct Proxy {
    pool: BackendPool,
    cache: Option<Arc<dyn ResponseCache>>,
    settings: SessionSettings,
}

impl Proxy {
    pub fn new(
        pool: BackendPool,
        cache: Option<Arc<dyn ResponseCache>>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            pool,
            cache,
            settings,
        }
    }

    /// Build pool, cache and settings from configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, PoolError> {
        let pool = BackendPool::from_config(&config.backends, config.balancing.strategy)?;
        let cache = cache::build(&config.cache);
        Ok(Self::new(pool, cache, SessionSettings::from(config)))
    }

    pub fn pool(&self) -> &BackendPool {
        &self.pool
    }

    pub fn cache(&self) -> Option<&Arc<dyn ResponseCache>> {
        self.cache.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Run a session in its own task and report how it ended.
    ///
    /// Never fails and never panics: errors and panics stay inside the
    /// session. Dropping the returned future aborts the session.
    pub async fn handle(self: Arc<Self>, conn: Connection) {
        let span = tracing::info_span!(
            "session",
            connection_id = %conn.id(),
            peer_addr = %conn.peer_addr,
            backend = tracing::field::Empty,
        );

        let task = AbortOnDrop(tokio::spawn(
            async move {
                let result = self.run_session(conn).await;
                report(&result);
            }
            .instrument(span.clone()),
        ));

        if let Err(e) = task.await {
            let _enter = span.enter();
            if e.is_panic() {
                metrics::record_session("panicked");
                tracing::error!("Session panicked");
            } else {
                tracing::debug!("Session cancelled");
            }
        }
    }
}

fn report(result: &Result<SessionOutcome, SessionError>) {
    match result {
        Ok(outcome) => {
            metrics::record_session(outcome.label());
            tracing::debug!(?outcome, "Session finished");
        }
        Err(e) if e.is_backend_unreachable() => {
            metrics::record_session_error(e.stage().as_str());
            tracing::warn!(error = %e, "Backend unreachable, closing client");
        }
        Err(e) => {
            metrics::record_session_error(e.stage().as_str());
            tracing::info!(stage = %e.stage(), error = %e, "Session ended with error");
        }
    }
}

/// Join handle that aborts its task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
