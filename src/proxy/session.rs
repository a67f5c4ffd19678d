//! Proxy session state machine.
//!
//! ```text
//! AwaitRequest ──0 bytes──────────────────────────────────────────▶ Closed
//!      │
//!      ├─ cache hit ─▶ reply from cache ──────────────────────────▶ Closed
//!      │
//!      └─ miss ─▶ SelectBackend ─▶ ConnectBackend ─▶ RelayRequest
//!                                      │ fail           │
//!                                      ▼                ▼
//!                                    Closed       RelayResponse ─▶ PopulateCache ─▶ Closed
//! ```
//!
//! Both sockets are owned by the session, so every exit path (including
//! errors and cancellation) releases them.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::RelayMode;
use crate::net::Connection;
use crate::observability::metrics;
use crate::proxy::error::{SessionError, Stage};
use crate::proxy::{fingerprint, Proxy};
use crate::resilience::within;

/// How a session ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Client disconnected before sending anything.
    ClientClosed,
    /// Reply served from the cache without contacting a backend.
    CacheHit { bytes: usize },
    /// Response relayed from backend `backend` (pool index).
    Relayed {
        backend: usize,
        bytes: usize,
        cached: bool,
    },
}

impl SessionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::ClientClosed => "client_closed",
            SessionOutcome::CacheHit { .. } => "cache_hit",
            SessionOutcome::Relayed { .. } => "relayed",
        }
    }
}

impl Proxy {
    /// Serve one client connection end to end.
    pub async fn run_session(&self, mut conn: Connection) -> Result<SessionOutcome, SessionError> {
        let settings = &self.settings;
        let idle = settings.deadlines.idle;
        let client = &mut conn.stream;

        let mut request = vec![0u8; settings.buffer_size];
        let n = within(Stage::ClientRead, idle, client.read(&mut request)).await?;
        if n == 0 {
            return Ok(SessionOutcome::ClientClosed);
        }
        request.truncate(n);
        tracing::trace!(bytes = n, "Request received");

        if let Some(cache) = &self.cache {
            let key = fingerprint::lookup_key(settings.cache_key, &request);
            let hit = cache.lookup(key);
            metrics::record_cache_lookup(hit.is_some());
            if let Some(value) = hit {
                within(Stage::ClientWrite, idle, client.write_all(&value)).await?;
                close_client(client, idle).await;
                return Ok(SessionOutcome::CacheHit { bytes: value.len() });
            }
        }

        let dispatch_key = conn.peer_addr.ip().to_string();
        let (index, backend) = self.pool.select(dispatch_key.as_bytes());
        tracing::Span::current().record("backend", tracing::field::display(backend));

        let mut upstream =
            within(Stage::Connect, settings.deadlines.connect, backend.connect()).await?;
        within(Stage::BackendWrite, idle, upstream.write_all(&request)).await?;

        let (bytes, captured) = self.relay_response(&mut upstream, client).await?;
        close_client(client, idle).await;

        let cached = match (&self.cache, captured) {
            (Some(cache), Some(response)) if !response.is_empty() => {
                let key = fingerprint::insert_key(settings.cache_key, &request, &response);
                cache.insert(key, &response)
            }
            _ => false,
        };

        Ok(SessionOutcome::Relayed {
            backend: index,
            bytes,
            cached,
        })
    }

    /// Forward backend bytes to the client as they arrive.
    ///
    /// Returns the byte count and, when caching is on and the response fits
    /// `max_value_bytes`, a copy of the full response.
    async fn relay_response(
        &self,
        upstream: &mut TcpStream,
        client: &mut TcpStream,
    ) -> Result<(usize, Option<Vec<u8>>), SessionError> {
        let settings = &self.settings;
        let idle = settings.deadlines.idle;
        let mut chunk = vec![0u8; settings.buffer_size];
        let mut captured = self.cache.as_ref().map(|_| Vec::new());
        let mut total = 0;

        loop {
            let n = within(Stage::BackendRead, idle, upstream.read(&mut chunk)).await?;
            if n == 0 {
                break;
            }
            within(Stage::ClientWrite, idle, client.write_all(&chunk[..n])).await?;
            total += n;

            let oversized = captured
                .as_ref()
                .is_some_and(|buf| buf.len() + n > settings.max_value_bytes);
            if oversized {
                tracing::debug!(
                    limit = settings.max_value_bytes,
                    "Response too large to cache"
                );
                captured = None;
            } else if let Some(buf) = captured.as_mut() {
                buf.extend_from_slice(&chunk[..n]);
            }

            if settings.relay == RelayMode::SingleRead {
                break;
            }
        }

        Ok((total, captured))
    }
}

/// Half-close the client so it sees EOF. The response is already delivered,
/// so a failure here does not fail the session.
async fn close_client(client: &mut TcpStream, idle: Duration) {
    if let Err(e) = within(Stage::ClientWrite, idle, client.shutdown()).await {
        tracing::trace!(error = %e, "Client shutdown failed");
    }
}
