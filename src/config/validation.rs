use crate::config::types::{Config, IdentityConfig, OutputConfig, RemoteConfig, RetryConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_identity_config(&config.identity)?;
    validate_retry_config(&config.retry)?;
    validate_remote_config(&config.remote)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates identity resolution configuration
fn validate_identity_config(config: &IdentityConfig) -> Result<(), ConfigError> {
    // Degenerate thread counts are tolerated at runtime, but a zero-sized
    // cache is always a configuration mistake.
    if config.cache_size == 0 {
        return Err(ConfigError::Validation(
            "cache_size must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates retry/backoff configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.min_wait_ms > config.max_wait_ms {
        return Err(ConfigError::Validation(format!(
            "retry min_wait_ms ({}) exceeds max_wait_ms ({})",
            config.min_wait_ms, config.max_wait_ms
        )));
    }
    Ok(())
}

/// Validates remote API configuration
fn validate_remote_config(config: &RemoteConfig) -> Result<(), ConfigError> {
    if config.base_url.is_empty() {
        return Err(ConfigError::Validation(
            "base_url cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.documents_path.is_empty() {
        return Err(ConfigError::Validation(
            "documents_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
