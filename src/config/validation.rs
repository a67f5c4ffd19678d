//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every backend address resolves to a `host:port` endpoint
//! - Validate value ranges (capacities > 0, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{CachePolicy, DispatchModel, ProxyConfig};
use crate::load_balancer::backend::BackendEndpoint;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no backends configured")]
    NoBackends,

    #[error("backend `{name}` has invalid address `{address}` (expected host:port)")]
    InvalidBackendAddress { name: String, address: String },

    #[error("invalid {field} `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::Zero("listener.backlog"));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for backend in &config.backends {
        if BackendEndpoint::parse(backend.display_name(), &backend.address).is_none() {
            errors.push(ValidationError::InvalidBackendAddress {
                name: backend.display_name().to_string(),
                address: backend.address.clone(),
            });
        }
    }

    if config.dispatch.model == DispatchModel::WorkerPool {
        if config.dispatch.queue_capacity == 0 {
            errors.push(ValidationError::Zero("dispatch.queue_capacity"));
        }
        if config.dispatch.workers == 0 {
            errors.push(ValidationError::Zero("dispatch.workers"));
        }
    }

    if config.cache.enabled {
        if config.cache.capacity == 0 {
            errors.push(ValidationError::Zero("cache.capacity"));
        }
        if config.cache.policy == CachePolicy::Ttl && config.cache.ttl_secs == 0 {
            errors.push(ValidationError::Zero("cache.ttl_secs"));
        }
    }

    if config.session.buffer_size == 0 {
        errors.push(ValidationError::Zero("session.buffer_size"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.idle_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.idle_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
