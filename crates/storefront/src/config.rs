//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOP_HOST` - Bind address (default: 0.0.0.0)
//! - `SHOP_PORT` - Listen port (default: 8080)
//! - `SHOP_LOG_FORMAT` - `json` (one event per line) or `pretty` (default: json)
//! - `SHOP_LOG_DIR` - Also write JSON events to a daily-rotated `shop.<date>.log` in
//!   this directory; stdout only if unset
//! - `SHOP_CATALOG_PATH` - JSON catalog file; the built-in catalog is used if unset
//! - `SHOP_SESSION_IDLE_TIMEOUT_SECS` - Evict sessions idle this long; sessions
//!   never expire if unset
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(format!("unknown log format '{other}' (expected json or pretty)")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Log output format
    pub log_format: LogFormat,
    /// Directory for rotated JSON log files
    pub log_dir: Option<PathBuf>,
    /// Catalog file to serve instead of the built-in catalog
    pub catalog_path: Option<PathBuf>,
    /// Idle time after which a session is evicted
    pub session_idle_timeout: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            log_format: LogFormat::default(),
            log_dir: None,
            catalog_path: None,
            session_idle_timeout: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = parse_or("SHOP_HOST", get("SHOP_HOST"), defaults.host)?;
        let port = parse_or("SHOP_PORT", get("SHOP_PORT"), defaults.port)?;
        let log_format = parse_or("SHOP_LOG_FORMAT", get("SHOP_LOG_FORMAT"), defaults.log_format)?;
        let log_dir = get("SHOP_LOG_DIR").map(PathBuf::from);
        let catalog_path = get("SHOP_CATALOG_PATH").map(PathBuf::from);
        let session_idle_timeout = get("SHOP_SESSION_IDLE_TIMEOUT_SECS")
            .map(|raw| parse_idle_timeout("SHOP_SESSION_IDLE_TIMEOUT_SECS", &raw))
            .transpose()?;

        Ok(Self {
            host,
            port,
            log_format,
            log_dir,
            catalog_path,
            session_idle_timeout,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional value, falling back to a default when unset.
fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a positive number of seconds.
fn parse_idle_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}
