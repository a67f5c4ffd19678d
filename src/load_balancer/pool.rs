//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the fixed, ordered list of backends loaded at startup
//! - Apply the configured load balancing algorithm to select a backend
//! - Reject an empty pool at construction

use thiserror::Error;

use crate::config::{BackendConfig, Strategy};
use crate::load_balancer::{self, backend::BackendEndpoint, LoadBalancer};
use crate::observability::metrics;

/// Error type for pool construction.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("backend pool is empty")]
    Empty,

    #[error("backend `{name}` has invalid address `{address}`")]
    InvalidAddress { name: String, address: String },
}

/// Immutable set of backends plus the algorithm choosing among them.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<BackendEndpoint>,
    balancer: Box<dyn LoadBalancer>,
}

impl BackendPool {
    /// Create a pool from parsed endpoints.
    pub fn new(
        backends: Vec<BackendEndpoint>,
        balancer: Box<dyn LoadBalancer>,
    ) -> Result<Self, PoolError> {
        if backends.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self { backends, balancer })
    }

    /// Create a pool from configuration.
    pub fn from_config(configs: &[BackendConfig], strategy: Strategy) -> Result<Self, PoolError> {
        let backends = configs
            .iter()
            .map(|config| {
                BackendEndpoint::parse(config.display_name(), &config.address).ok_or_else(|| {
                    PoolError::InvalidAddress {
                        name: config.display_name().to_string(),
                        address: config.address.clone(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            backends = backends.len(),
            strategy = %strategy,
            "Backend pool ready"
        );

        Self::new(backends, load_balancer::build(strategy))
    }

    /// Select a backend for the given dispatch key.
    pub fn select(&self, dispatch_key: &[u8]) -> (usize, &BackendEndpoint) {
        let index = self.balancer.select(dispatch_key, self.backends.len());
        let backend = &self.backends[index];
        metrics::record_backend_selection(&backend.name);
        tracing::trace!(
            index,
            backend = %backend,
            algorithm = self.balancer.name(),
            "Backend selected"
        );
        (index, backend)
    }

    /// Backend at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&BackendEndpoint> {
        self.backends.get(index)
    }

    /// Number of backends (always at least one).
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the pool has no backends; never true after construction.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
