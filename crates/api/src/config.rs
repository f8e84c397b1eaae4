use axum::http::HeaderValue;
use assetrack_core::group::DEFAULT_GROUP_ALLOCATION_ATTEMPTS;

/// A configuration value that could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks after the listener stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Select-then-allocate rounds for group allocation (default: `3`).
    pub group_allocation_attempts: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `3000`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                       |
    /// | `GROUP_ALLOCATION_ATTEMPTS` | `3`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("PORT", "3000", "u16")?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    expected: "origin",
                    value: origin.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", "30", "u64")?;
        let shutdown_timeout_secs = parse_var("SHUTDOWN_TIMEOUT_SECS", "30", "u64")?;
        let group_allocation_attempts = parse_var(
            "GROUP_ALLOCATION_ATTEMPTS",
            &DEFAULT_GROUP_ALLOCATION_ATTEMPTS.to_string(),
            "positive integer",
        )?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            group_allocation_attempts,
        })
    }
}

/// The `DATABASE_URL` connection string. Required.
pub fn database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = std::env::var(var).unwrap_or_else(|_| default.to_string());
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value,
    })
}
