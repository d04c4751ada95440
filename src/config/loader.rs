//! Configuration loading from disk and the environment.

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Apply environment overrides: `PORT` for the listener and
/// `MEMORY_API_BASE` for the upstream base URL.
pub fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Ok(port) = std::env::var("PORT") {
        match port.parse::<u16>() {
            Ok(port) => config.listener.set_port(port),
            Err(_) => tracing::warn!(value = %port, "Ignoring non-numeric PORT override"),
        }
    }
    if let Ok(base) = std::env::var("MEMORY_API_BASE") {
        config.upstream.base_url = base;
    }
}

fn validate_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "listener.bind_address '{}' is not a valid socket address",
            config.listener.bind_address
        )));
    }

    let base = Url::parse(&config.upstream.base_url).map_err(|e| {
        ConfigError::Validation(format!(
            "upstream.base_url '{}' is not a valid URL: {e}",
            config.upstream.base_url
        ))
    })?;
    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "upstream.base_url scheme '{}' is not http or https",
            base.scheme()
        )));
    }

    if config.upstream.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "upstream.timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_bind_address() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = "ftp://127.0.0.1/v1".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = GatewayConfig::default();
        config.upstream.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }
}
