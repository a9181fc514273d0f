//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ELECTROMART_API_URL` - Base URL of the ElectroMart API (default: `http://localhost:8001/api`)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DATA_DIR` - Directory for the local session store
//!   (default: `<platform data dir>/electromart`)
//! - `STOREFRONT_PRODUCT_LIMIT` - Products per listing page (default: 20)
//! - `STOREFRONT_FEATURED_LIMIT` - Products on the home page (default: 8)
//! - `STOREFRONT_RECOMMENDATION_LIMIT` - Recommendations on the home page (default: 6)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8001/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Remote API configuration
    pub api: ApiConfig,
    /// Directory holding the persisted session
    pub data_dir: PathBuf,
    /// Page sizes
    pub limits: PageLimits,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL all endpoints are resolved against
    pub base_url: Url,
}

/// How many items each page asks the API for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub products: u32,
    pub featured: u32,
    pub recommendations: u32,
    pub reviews: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            products: 20,
            featured: 8,
            recommendations: 6,
            reviews: 20,
        }
    }
}

impl StorefrontConfig {
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

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);
        let defaults = PageLimits::default();

        let host = env.parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("STOREFRONT_PORT", 3000_u16)?;
        let api = ApiConfig::from_env(&env)?;
        let data_dir = env
            .optional("STOREFRONT_DATA_DIR")
            .map_or_else(default_data_dir, PathBuf::from);

        let limits = PageLimits {
            products: env.parse_or("STOREFRONT_PRODUCT_LIMIT", defaults.products)?,
            featured: env.parse_or("STOREFRONT_FEATURED_LIMIT", defaults.featured)?,
            recommendations: env
                .parse_or("STOREFRONT_RECOMMENDATION_LIMIT", defaults.recommendations)?,
            reviews: defaults.reviews,
        };

        Ok(Self {
            host,
            port,
            api,
            data_dir,
            limits,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ApiConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let raw = env
            .optional("ELECTROMART_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self {
            base_url: parse_api_url("ELECTROMART_API_URL", &raw)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse a variable, falling back to a default when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse and check an API base URL: http(s) only, must be able to carry a path.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL cannot carry a path".to_string(),
        ));
    }

    Ok(url)
}

/// Platform data directory, or a dot-directory in the working directory.
fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(".electromart"),
        |dir| dir.join("electromart"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:8001/api");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.limits, PageLimits::default());
        assert!(config.sentry_dsn.is_none());
        assert!(config.data_dir.ends_with("electromart") || config.data_dir.ends_with(".electromart"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ELECTROMART_API_URL", "https://api.electromart.in/api"),
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_DATA_DIR", "/tmp/em"),
            ("STOREFRONT_PRODUCT_LIMIT", "50"),
        ])
        .unwrap();

        assert_eq!(config.api.base_url.host_str(), Some("api.electromart.in"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/em"));
        assert_eq!(config.limits.products, 50);
        assert_eq!(config.limits.featured, 8);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("STOREFRONT_PORT", "  "), ("ELECTROMART_API_URL", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.api.base_url.as_str(), "http://localhost:8001/api");
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("STOREFRONT_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_rejects_non_http_api_url() {
        let err = load(&[("ELECTROMART_API_URL", "ftp://example.com/api")]).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));

        let err = load(&[("ELECTROMART_API_URL", "mailto:ops@example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
