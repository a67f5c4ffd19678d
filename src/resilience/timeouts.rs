//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound backend connect time
//! - Bound every individual read/write on either side of a session
//! - Cancel the stalled operation cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from I/O errors
//! - An expired deadline ends only the owning session

use std::future::Future;
use std::io;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::proxy::error::{SessionError, Stage};

/// Per-session deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// Backend connection establishment.
    pub connect: Duration,
    /// Any single read or write.
    pub idle: Duration,
}

impl From<&TimeoutConfig> for Deadlines {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_secs),
            idle: Duration::from_secs(config.idle_secs),
        }
    }
}

impl Default for Deadlines {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

/// Run an I/O future under a deadline, tagging failures with `stage`.
pub async fn within<T, F>(stage: Stage, limit: Duration, fut: F) -> Result<T, SessionError>
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(SessionError::Io { stage, source }),
        Err(_) => Err(SessionError::Timeout {
            stage,
            after: limit,
        }),
    }
}
