//! Session error taxonomy.
//!
//! Every failure is scoped to one session: it is logged, counted, and the
//! worker moves on. Nothing here unwinds into the pool, queue or cache.

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Step of the session that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ClientRead,
    Connect,
    BackendWrite,
    BackendRead,
    ClientWrite,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ClientRead => "client_read",
            Stage::Connect => "connect",
            Stage::BackendWrite => "backend_write",
            Stage::BackendRead => "backend_read",
            Stage::ClientWrite => "client_write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session ended early.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{stage} failed: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },
}

impl SessionError {
    pub fn stage(&self) -> Stage {
        match self {
            SessionError::Io { stage, .. } | SessionError::Timeout { stage, .. } => *stage,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }

    /// Backend refused or could not be reached.
    pub fn is_backend_unreachable(&self) -> bool {
        self.stage() == Stage::Connect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_stage() {
        let err = SessionError::Io {
            stage: Stage::Connect,
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert!(err.to_string().starts_with("connect failed"));
        assert!(err.is_backend_unreachable());
        assert!(!err.is_timeout());

        let err = SessionError::Timeout {
            stage: Stage::BackendRead,
            after: Duration::from_secs(3),
        };
        assert_eq!(err.to_string(), "backend_read timed out after 3s");
        assert!(err.is_timeout());
    }
}
