//! TCP listener implementation.
//!
//! # Responsibilities
//! - Bind to the configured address with the configured backlog
//! - Accept incoming TCP connections
//! - Attach a tracking guard to every accepted connection

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};

use crate::config::ListenerConfig;
use crate::net::connection::{Connection, ConnectionTracker};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    Bind(std::io::Error),
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(std::io::Error),
}

/// A TCP listener that hands out tracked [`Connection`]s.
#[derive(Debug)]
pub struct Listener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// Live connection accounting.
    tracker: ConnectionTracker,
}

impl Listener {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ListenerError::Bind)?;
        socket.set_reuseaddr(true).map_err(ListenerError::Bind)?;
        socket.bind(addr).map_err(ListenerError::Bind)?;
        let listener = socket.listen(config.backlog).map_err(ListenerError::Bind)?;

        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            backlog = config.backlog,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            tracker: ConnectionTracker::new(),
        })
    }

    /// Accept a new connection.
    pub async fn accept(&self) -> Result<Connection, ListenerError> {
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        let guard = self.tracker.track();

        tracing::debug!(
            connection_id = %guard.id(),
            peer_addr = %addr,
            active = self.tracker.active_count(),
            "Connection accepted"
        );

        Ok(Connection::new(stream, addr, guard))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Tracker counting connections accepted by this listener that are still open.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn accepts_and_tracks_connections() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
            backlog: 16,
        };
        let listener = Listener::bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _client = TcpStream::connect(addr).await.unwrap();
        let conn = listener.accept().await.unwrap();
        assert_eq!(listener.tracker().active_count(), 1);
        assert!(conn.peer_addr.ip().is_loopback());

        drop(conn);
        assert_eq!(listener.tracker().active_count(), 0);
    }

    #[tokio::test]
    async fn bad_address_fails_to_bind() {
        let config = ListenerConfig {
            bind_address: "not-an-address".into(),
            backlog: 16,
        };
        assert!(matches!(
            Listener::bind(&config).await,
            Err(ListenerError::Bind(_))
        ));
    }
}
