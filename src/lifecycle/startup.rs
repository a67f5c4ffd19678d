//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Bind the listener and begin accepting traffic
//! - Wire OS signals to graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Configuration arrives already validated
//! - Listener binds last (traffic only when ready)

use crate::config::ProxyConfig;
use crate::net::Listener;
use crate::observability::metrics;
use crate::proxy::ProxyServer;

use super::{signals, Shutdown};

/// Run the load balancer until SIGINT/SIGTERM, then drain and return.
pub async fn run(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    let signal_task = signals::spawn_signal_handler(shutdown.clone());

    let result = serve(config, shutdown).await;
    signal_task.abort();
    result
}

/// Serve with an externally owned shutdown coordinator.
pub async fn serve(
    config: ProxyConfig,
    shutdown: Shutdown,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::info!(
        backends = config.backends.len(),
        strategy = %config.balancing.strategy,
        cache_enabled = config.cache.enabled,
        cache_policy = %config.cache.policy,
        cache_capacity = config.cache.capacity,
        "Configuration loaded"
    );

    let server = ProxyServer::new(config)?;
    let listener = Listener::bind(&server.config().listener).await?;

    // Subscribe before serving so an early trigger is not missed.
    let rx = shutdown.subscribe();
    server.run(listener, rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
