//! Load balancer server.
//!
//! # Responsibilities
//! - Build the proxy core (pool, cache, settings) from configuration
//! - Run the accept loop, feeding connections into the dispatcher
//! - Stop accepting on shutdown, drain in-flight sessions, then return

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::config::ProxyConfig;
use crate::dispatch::Dispatcher;
use crate::load_balancer::PoolError;
use crate::net::Listener;
use crate::proxy::Proxy;

/// Delay before retrying after a failed accept (e.g. out of descriptors).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// The TCP load balancer.
pub struct ProxyServer {
    config: ProxyConfig,
    proxy: Arc<Proxy>,
}

impl ProxyServer {
    /// Create a new server with the given (validated) configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, PoolError> {
        let proxy = Arc::new(Proxy::from_config(&config)?);
        Ok(Self { config, proxy })
    }

    /// Shared proxy core, e.g. for inspecting the cache.
    pub fn proxy(&self) -> &Arc<Proxy> {
        &self.proxy
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            model = ?self.config.dispatch.model,
            "Load balancer starting"
        );

        let mut dispatcher = Dispatcher::from_config(&self.config.dispatch, self.proxy.clone());

        loop {
            let conn = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        continue;
                    }
                },
                _ = shutdown.recv() => break,
            };

            // Dispatch may wait on a full queue; shutdown must still get through.
            tokio::select! {
                _ = dispatcher.dispatch(conn) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Stopped accepting connections");

        let drain_timeout = Duration::from_secs(self.config.lifecycle.drain_timeout_secs);
        dispatcher.shutdown(drain_timeout).await;

        // Aborted sessions release their sockets asynchronously.
        if !listener.tracker().wait_idle(Duration::from_secs(1)).await {
            tracing::warn!(
                active = listener.tracker().active_count(),
                "Connections still open after drain"
            );
        }

        tracing::info!("Load balancer stopped");
        Ok(())
    }
}
