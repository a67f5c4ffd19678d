//! One task per accepted connection.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::dispatch::drain;
use crate::net::Connection;
use crate::proxy::Proxy;

/// Spawns a session per connection with no queue and no concurrency bound.
/// Every task stays owned by the set, so shutdown can wait for or abort it.
#[derive(Debug)]
pub struct PerConnection {
    proxy: Arc<Proxy>,
    sessions: JoinSet<()>,
}

impl PerConnection {
    pub fn new(proxy: Arc<Proxy>) -> Self {
        tracing::info!("Per-connection dispatch started");
        Self {
            proxy,
            sessions: JoinSet::new(),
        }
    }

    pub fn spawn(&mut self, conn: Connection) {
        // Reap finished sessions so the set only holds live ones.
        while self.sessions.try_join_next().is_some() {}
        self.sessions.spawn(self.proxy.clone().handle(conn));
    }

    /// Sessions spawned and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.sessions.len()
    }

    pub async fn shutdown(mut self, timeout: Duration) {
        drain(&mut self.sessions, timeout, "sessions").await;
    }
}
