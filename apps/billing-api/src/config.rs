//! Billing API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use bakeline_core::TaxMode;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Billing API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Address to bind to
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Directory holding one JSON file per cart session
    pub session_dir: PathBuf,

    /// Upper bound on pooled SQLite connections
    pub db_max_connections: u32,

    /// Tries before a product fetch gives up
    pub product_fetch_attempts: u32,

    /// Tax mode used for cart totals and documents that omit one
    pub default_tax_mode: TaxMode,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            bind_addr: "0.0.0.0".to_string(),
            database_path: PathBuf::from("./bakeline.db"),
            session_dir: PathBuf::from("./sessions"),
            db_max_connections: 5,
            product_fetch_attempts: 3,
            default_tax_mode: TaxMode::Inclusive,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            http_port: parse_var("BAKELINE_HTTP_PORT", defaults.http_port)?,

            bind_addr: env::var("BAKELINE_BIND_ADDR").unwrap_or(defaults.bind_addr),

            database_path: env::var("BAKELINE_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            session_dir: env::var("BAKELINE_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_dir),

            db_max_connections: parse_var(
                "BAKELINE_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,

            product_fetch_attempts: parse_var(
                "BAKELINE_PRODUCT_FETCH_ATTEMPTS",
                defaults.product_fetch_attempts,
            )?,

            default_tax_mode: parse_var("BAKELINE_DEFAULT_TAX_MODE", defaults.default_tax_mode)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "BAKELINE_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if self.product_fetch_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "BAKELINE_PRODUCT_FETCH_ATTEMPTS".to_string(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// The address the HTTP server listens on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BAKELINE_BIND_ADDR".to_string()))
    }
}

/// Reads `name`, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
        assert_eq!(config.default_tax_mode, TaxMode::Inclusive);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = ApiConfig {
            product_fetch_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(name)) if name == "BAKELINE_PRODUCT_FETCH_ATTEMPTS"
        ));
    }

    #[test]
    fn test_bad_bind_addr_rejected() {
        let config = ApiConfig {
            bind_addr: "not an address".to_string(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
