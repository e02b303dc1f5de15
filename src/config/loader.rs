//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [pool]
            addresses = ["http://api1.example.com", "http://api2.example.com"]

            [circuit_breaker]
            failure_threshold = 5
            reset_timeout_ms = 10000

            [dispatch]
            slow_call_threshold_ms = 2500

            [observability]
            metrics_enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.pool.addresses.len(), 2);

        let breaker = config.circuit_breaker.to_breaker_config();
        assert_eq!(breaker.failure_threshold, 5);
        assert_eq!(breaker.reset_timeout, Duration::from_secs(10));

        let dispatch = config.dispatch.to_dispatch_config();
        assert_eq!(dispatch.slow_call_threshold, Duration::from_millis(2500));
        assert!(!config.observability.metrics_enabled);
        assert!(config.admin.enabled);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.pool.addresses.len(), 3);
        assert_eq!(config.circuit_breaker.failure_threshold, 3);
        assert_eq!(config.circuit_breaker.reset_timeout_ms, 5000);
        assert_eq!(config.dispatch.slow_call_threshold_ms, 5000);
    }

    #[test]
    fn test_empty_pool_is_fatal() {
        let err = parse_config("[pool]\naddresses = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation failed: pool.addresses must contain at least one backend"
        );
    }

    #[test]
    fn test_https_backend_is_fatal() {
        let err = parse_config(
            "[pool]\naddresses = [\"https://127.0.0.1:5000/api/endpoint\"]\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref errors) if errors.len() == 1
        ));
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_config("[pool\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
