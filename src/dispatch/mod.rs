//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted Connection
//!     → Dispatcher (model chosen at startup)
//!         - worker_pool:    queue.rs (bounded FIFO) → workers.rs (N loops)
//!         - per_connection: per_connection.rs (one task each)
//!     → Proxy::handle
//! ```
//!
//! # Design Decisions
//! - A connection is owned by exactly one task from dispatch to close
//! - Full queue means backpressure on the accept loop, never a drop
//! - All tasks live in a JoinSet, so shutdown can drain and then abort them

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::config::{DispatchConfig, DispatchModel};
use crate::net::Connection;
use crate::proxy::Proxy;

pub mod per_connection;
pub mod queue;
pub mod workers;

pub use per_connection::PerConnection;
pub use queue::{DispatchQueue, QueueClosed};
pub use workers::WorkerPool;

/// The configured concurrency model.
#[derive(Debug)]
pub enum Dispatcher {
    WorkerPool(WorkerPool),
    PerConnection(PerConnection),
}

impl Dispatcher {
    pub fn from_config(config: &DispatchConfig, proxy: Arc<Proxy>) -> Self {
        match config.model {
            DispatchModel::WorkerPool => Dispatcher::WorkerPool(WorkerPool::spawn(
                config.workers,
                config.queue_capacity,
                proxy,
            )),
            DispatchModel::PerConnection => Dispatcher::PerConnection(PerConnection::new(proxy)),
        }
    }

    /// Hand a connection to a worker. May wait for queue space.
    pub async fn dispatch(&mut self, conn: Connection) {
        match self {
            Dispatcher::WorkerPool(pool) => {
                if let Err(QueueClosed(conn)) = pool.submit(conn).await {
                    tracing::warn!(
                        connection_id = %conn.id(),
                        peer_addr = %conn.peer_addr,
                        "Dispatch queue closed, dropping connection"
                    );
                }
            }
            Dispatcher::PerConnection(spawner) => spawner.spawn(conn),
        }
    }

    pub async fn shutdown(self, timeout: Duration) {
        match self {
            Dispatcher::WorkerPool(pool) => pool.shutdown(timeout).await,
            Dispatcher::PerConnection(spawner) => spawner.shutdown(timeout).await,
        }
    }
}

/// Wait for every task in `set`, aborting the rest after `timeout`.
pub(crate) async fn drain(set: &mut JoinSet<()>, timeout: Duration, what: &'static str) {
    let remaining = set.len();
    if remaining == 0 {
        return;
    }
    tracing::info!(remaining, what, "Draining");

    let finished = tokio::time::timeout(timeout, async {
        while set.join_next().await.is_some() {}
    })
    .await
    .is_ok();

    if !finished {
        tracing::warn!(
            remaining = set.len(),
            what,
            timeout_secs = timeout.as_secs(),
            "Drain timed out, aborting"
        );
        set.shutdown().await;
    }
}
