//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server as `{host, port}`
//! - Parse `host:port` strings from configuration
//! - Open short-lived transport connections (one per cache miss)

use std::fmt;
use std::io;
use tokio::net::TcpStream;

/// A single backend server. Immutable after startup; identified by its
/// index in the [`BackendPool`](crate::load_balancer::pool::BackendPool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    /// Name used in logs and metrics.
    pub name: String,
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl BackendEndpoint {
    /// Parse `host:port`, accepting bracketed IPv6 hosts (`[::1]:80`).
    pub fn parse(name: &str, address: &str) -> Option<Self> {
        let (host, port) = address.rsplit_once(':')?;
        let port = port.parse::<u16>().ok()?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() || port == 0 {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// Open a new connection to this backend.
    pub async fn connect(&self) -> io::Result<TcpStream> {
        TcpStream::connect((self.host.as_str(), self.port)).await
    }
}

impl fmt::Display for BackendEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let backend = BackendEndpoint::parse("b1", "10.198.138.212:5297").unwrap();
        assert_eq!(backend.host, "10.198.138.212");
        assert_eq!(backend.port, 5297);
        assert_eq!(backend.to_string(), "10.198.138.212:5297");
    }

    #[test]
    fn parses_hostname_and_ipv6() {
        let named = BackendEndpoint::parse("web", "web.internal:80").unwrap();
        assert_eq!(named.host, "web.internal");

        let v6 = BackendEndpoint::parse("v6", "[::1]:9100").unwrap();
        assert_eq!(v6.host, "::1");
        assert_eq!(v6.to_string(), "[::1]:9100");
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(BackendEndpoint::parse("x", "no-port").is_none());
        assert!(BackendEndpoint::parse("x", ":80").is_none());
        assert!(BackendEndpoint::parse("x", "host:notaport").is_none());
        assert!(BackendEndpoint::parse("x", "host:0").is_none());
        assert!(BackendEndpoint::parse("x", "host:70000").is_none());
    }
}
