//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Per-request timeout enforced by the HTTP layer
    pub request_timeout: Duration,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let port: u16 = var("DB_PORT", "5432")
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("DB_PORT"))?;
                format!(
                    "postgres://{}:{}@{}:{}/{}?sslmode=disable",
                    var("DB_USER", "app_user"),
                    var("DB_PASSWORD", "app_password"),
                    var("DB_ADDR", "postgres"),
                    port,
                    var("DB_NAME", "app_db"),
                )
            }
        };

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = var("HOST", "0.0.0.0");

        let port = var("PORT", "8080")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let request_timeout_ms: u64 = var("REQUEST_TIMEOUT_MS", "1000")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("REQUEST_TIMEOUT_MS"))?;

        let log_format = match var("LOG_FORMAT", "pretty").as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => return Err(ConfigError::InvalidValue("LOG_FORMAT")),
        };

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            request_timeout: Duration::from_millis(request_timeout_ms),
            log_format,
        })
    }

    /// Address the HTTP server listens on
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
