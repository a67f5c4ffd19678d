//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from a TOML file without validating it.
///
/// Callers apply command-line overrides and then call
/// [`ProxyConfig::validated`].
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

impl ProxyConfig {
    /// Run semantic validation, consuming the config on success.
    pub fn validated(self) -> Result<Self, ConfigError> {
        validate_config(&self).map_err(ConfigError::Validation)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CacheKey, CachePolicy, DispatchModel, Strategy};

    #[test]
    fn parses_full_config() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:5294"

            [[backends]]
            name = "web-1"
            address = "10.198.138.212:5297"

            [[backends]]
            address = "10.198.138.212:5296"

            [balancing]
            strategy = "hash"

            [dispatch]
            model = "per_connection"

            [cache]
            policy = "ttl"
            capacity = 100
            ttl_secs = 30
            key = "request_target"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:5294");
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.backends[0].name, "web-1");
        assert_eq!(config.backends[1].display_name(), "10.198.138.212:5296");
        assert_eq!(config.balancing.strategy, Strategy::Hash);
        assert_eq!(config.dispatch.model, DispatchModel::PerConnection);
        assert_eq!(config.cache.policy, CachePolicy::Ttl);
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.cache.key, CacheKey::RequestTarget);
        // Untouched sections keep their defaults.
        assert_eq!(config.session.buffer_size, 4096);
    }

    #[test]
    fn rejects_unknown_strategy() {
        let err = parse_config("[balancing]\nstrategy = \"random\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_error_lists_every_problem() {
        let mut config = ProxyConfig::default();
        config.timeouts.idle_secs = 0;

        let err = config.validated().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no backends configured"));
        assert!(message.contains("timeouts.idle_secs"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/cachelb.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
