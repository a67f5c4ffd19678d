//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, backlog).
    pub listener: ListenerConfig,

    /// Backend server definitions, in pool order.
    pub backends: Vec<BackendConfig>,

    /// Load balancing strategy.
    pub balancing: BalancingConfig,

    /// Concurrency model for accepted connections.
    pub dispatch: DispatchConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Per-session buffer and relay settings.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Shutdown behaviour.
    pub lifecycle: LifecycleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum number of pending connections in the kernel accept queue.
    pub backlog: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            backlog: 100,
        }
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend identifier used in logs and metrics. Defaults to the address.
    #[serde(default)]
    pub name: String,

    /// Backend address as `host:port` (e.g., "127.0.0.1:9100").
    pub address: String,
}

impl BackendConfig {
    /// Backend with the address doubling as its name.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            address: address.into(),
        }
    }

    /// Name used for logs, falling back to the address.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.address
        } else {
            &self.name
        }
    }
}

/// Backend selection algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Rotate through backends in pool order.
    #[default]
    RoundRobin,
    /// Pin each client address to one backend.
    Hash,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::RoundRobin => f.write_str("round_robin"),
            Strategy::Hash => f.write_str("hash"),
        }
    }
}

/// Load balancing configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancingConfig {
    pub strategy: Strategy,
}

/// How accepted connections reach a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchModel {
    /// Fixed workers draining a bounded queue.
    #[default]
    WorkerPool,
    /// One task per accepted connection, no queue.
    PerConnection,
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Concurrency model.
    pub model: DispatchModel,

    /// Capacity of the dispatch queue (worker pool only).
    pub queue_capacity: usize,

    /// Number of workers (worker pool only).
    pub workers: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            model: DispatchModel::WorkerPool,
            queue_capacity: 20,
            workers: 4,
        }
    }
}

/// Cache eviction/expiry policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Least-recently-used eviction.
    #[default]
    Lru,
    /// Time-based expiry, inserts rejected once full.
    Ttl,
    /// Append until full, then overwrite the first slot.
    Naive,
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachePolicy::Lru => f.write_str("lru"),
            CachePolicy::Ttl => f.write_str("ttl"),
            CachePolicy::Naive => f.write_str("naive"),
        }
    }
}

/// Which bytes identify a cached response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKey {
    /// The raw request bytes.
    #[default]
    Request,
    /// The second token of the request line (e.g. `/index.html`).
    RequestTarget,
    /// Legacy mode: entries are stored under the response bytes themselves.
    /// Lookups still use the raw request.
    Response,
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the response cache.
    pub enabled: bool,

    /// Eviction/expiry policy.
    pub policy: CachePolicy,

    /// Maximum number of entries.
    pub capacity: usize,

    /// Entry lifetime in seconds (ttl policy only).
    pub ttl_secs: u64,

    /// Source of the cache key.
    pub key: CacheKey,

    /// Responses larger than this are relayed but not cached.
    pub max_value_bytes: usize,

    /// Let a full ttl cache reuse the slot of an expired entry.
    pub reclaim_expired: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: CachePolicy::Lru,
            capacity: 5,
            ttl_secs: 30,
            key: CacheKey::Request,
            max_value_bytes: 64 * 1024,
            reclaim_expired: false,
        }
    }
}

/// How the backend response is relayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    /// Forward chunks until the backend closes.
    #[default]
    Streaming,
    /// Forward exactly one read.
    SingleRead,
}

/// Per-session settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Size of the request read and of each relay chunk.
    pub buffer_size: usize,

    /// Relay mode for backend responses.
    pub relay: RelayMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 4096,
            relay: RelayMode::Streaming,
        }
    }
}

/// Timeout configuration for network operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Limit for any single read or write on either side, in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            idle_secs: 30,
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long in-flight sessions may run after shutdown is requested.
    pub drain_timeout_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_name_falls_back_to_address() {
        let backend = BackendConfig::new("10.0.0.1:9100");
        assert_eq!(backend.display_name(), "10.0.0.1:9100");

        let named = BackendConfig {
            name: "web-1".into(),
            address: "10.0.0.1:9100".into(),
        };
        assert_eq!(named.display_name(), "web-1");
    }

    #[test]
    fn defaults_match_worker_pool_with_lru() {
        let config = ProxyConfig::default();
        assert_eq!(config.dispatch.model, DispatchModel::WorkerPool);
        assert_eq!(config.cache.policy, CachePolicy::Lru);
        assert_eq!(config.cache.key, CacheKey::Request);
        assert_eq!(config.balancing.strategy, Strategy::RoundRobin);
        assert!(config.backends.is_empty());
    }
}
