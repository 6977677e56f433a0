//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `QUICKKART_HOST` - Bind address (default: 127.0.0.1)
//! - `QUICKKART_PORT` - Listen port (default: 3000)
//! - `QUICKKART_BASE_URL` - Public URL; `https://` enables secure cookies
//!   (default: <http://localhost:3000>)
//! - `QUICKKART_CATALOG_URL` - Product catalog API base (default: <https://fakestoreapi.com>)
//! - `QUICKKART_CATALOG_TIMEOUT_SECS` - Catalog request timeout (default: 10)
//! - `QUICKKART_PAYMENT_DELAY_MS` - Simulated payment duration (default: 2000)
//! - `QUICKKART_CONTACT_DELAY_MS` - Simulated contact send duration (default: 1500)
//! - `QUICKKART_SESSION_IDLE_MINUTES` - Drop a shopper's session after this long
//!   without a request (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default product catalog.
pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct QuickKartConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// How long the simulated payment takes
    pub payment_delay: Duration,
    /// How long the simulated contact submission takes
    pub contact_delay: Duration,
    /// Inactivity after which a session and its cart are forgotten
    pub session_idle: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Product catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; `/products` is appended to it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl QuickKartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_or_default(&lookup, "QUICKKART_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or_default(&lookup, "QUICKKART_PORT", 3000_u16)?;
        let base_url = lookup("QUICKKART_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        let catalog_url = lookup("QUICKKART_CATALOG_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
        let catalog = CatalogConfig {
            base_url: Url::parse(catalog_url.trim()).map_err(|e| {
                ConfigError::InvalidEnvVar("QUICKKART_CATALOG_URL".to_string(), e.to_string())
            })?,
            timeout: Duration::from_secs(parse_or_default(
                &lookup,
                "QUICKKART_CATALOG_TIMEOUT_SECS",
                10_u64,
            )?),
        };

        let payment_delay =
            Duration::from_millis(parse_or_default(&lookup, "QUICKKART_PAYMENT_DELAY_MS", 2000)?);
        let contact_delay =
            Duration::from_millis(parse_or_default(&lookup, "QUICKKART_CONTACT_DELAY_MS", 1500)?);
        let session_idle_minutes =
            parse_or_default(&lookup, "QUICKKART_SESSION_IDLE_MINUTES", 30_u64)?;
        if session_idle_minutes == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "QUICKKART_SESSION_IDLE_MINUTES".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let session_idle = Duration::from_secs(session_idle_minutes.saturating_mul(60));

        Ok(Self {
            host,
            port,
            base_url,
            catalog,
            payment_delay,
            contact_delay,
            session_idle,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable if it is set, otherwise use `default`.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        _ => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<QuickKartConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        QuickKartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.catalog.base_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(config.catalog.timeout, Duration::from_secs(10));
        assert_eq!(config.payment_delay, Duration::from_millis(2000));
        assert_eq!(config.contact_delay, Duration::from_millis(1500));
        assert_eq!(config.session_idle, Duration::from_secs(30 * 60));
        assert!(config.sentry_dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("QUICKKART_HOST", "0.0.0.0"),
            ("QUICKKART_PORT", "8080"),
            ("QUICKKART_BASE_URL", "https://shop.example"),
            ("QUICKKART_CATALOG_URL", "http://127.0.0.1:9999/api"),
            ("QUICKKART_PAYMENT_DELAY_MS", "10"),
            ("SENTRY_DSN", ""),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.is_secure());
        assert_eq!(config.catalog.base_url.as_str(), "http://127.0.0.1:9999/api");
        assert_eq!(config.payment_delay, Duration::from_millis(10));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_follows_port() {
        let config = config_from(&[("QUICKKART_PORT", "4100")]).unwrap();
        assert_eq!(config.base_url, "http://localhost:4100");
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("QUICKKART_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "QUICKKART_PORT"));
    }

    #[test]
    fn test_session_idle_must_be_positive() {
        let config = config_from(&[("QUICKKART_SESSION_IDLE_MINUTES", "5")]).unwrap();
        assert_eq!(config.session_idle, Duration::from_secs(300));

        let err = config_from(&[("QUICKKART_SESSION_IDLE_MINUTES", "0")]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "QUICKKART_SESSION_IDLE_MINUTES")
        );
    }

    #[test]
    fn test_invalid_catalog_url() {
        let err = config_from(&[("QUICKKART_CATALOG_URL", "::not a url")]).unwrap_err();
        assert!(err.to_string().starts_with("Invalid environment variable QUICKKART_CATALOG_URL"));
    }
}
