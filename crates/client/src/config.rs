//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOPFRONT_API_BASE` - Base URL of the store service (default: `http://localhost:3000/api`)
//! - `SHOPFRONT_DATA_DIR` - Directory holding the durable slots (default: `.shopfront`)
//! - `SHOPFRONT_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `SHOPFRONT_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE: &str = "http://localhost:3000/api";
const DEFAULT_DATA_DIR: &str = ".shopfront";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ShopfrontConfig {
    /// Remote service settings
    pub api: ApiConfig,
    /// Directory for the `cart` and `token` slots
    pub data_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Remote service settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: Url,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

impl ShopfrontConfig {
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

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = parse_api_base(
            "SHOPFRONT_API_BASE",
            &lookup("SHOPFRONT_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        )?;
        let catalog_cache_ttl = parse_secs("SHOPFRONT_CATALOG_CACHE_TTL_SECS", &lookup)?
            .unwrap_or(Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS));
        let request_timeout = parse_secs("SHOPFRONT_REQUEST_TIMEOUT_SECS", &lookup)?;

        let data_dir = lookup("SHOPFRONT_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        Ok(Self {
            api: ApiConfig {
                base_url,
                catalog_cache_ttl,
                request_timeout,
            },
            data_dir,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the service base URL; only http(s) is accepted.
fn parse_api_base(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse an optional whole number of seconds.
fn parse_secs(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<Duration>, ConfigError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ShopfrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ShopfrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3000/api");
        assert_eq!(config.api.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.api.request_timeout, None);
        assert_eq!(config.data_dir, PathBuf::from(".shopfront"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SHOPFRONT_API_BASE", "https://shop.example.com/api/"),
            ("SHOPFRONT_DATA_DIR", "/var/lib/shopfront"),
            ("SHOPFRONT_CATALOG_CACHE_TTL_SECS", "30"),
            ("SHOPFRONT_REQUEST_TIMEOUT_SECS", " 10 "),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();
        assert_eq!(config.api.base_url.host_str(), Some("shop.example.com"));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/shopfront"));
        assert_eq!(config.api.catalog_cache_ttl, Duration::from_secs(30));
        assert_eq!(config.api.request_timeout, Some(Duration::from_secs(10)));
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_rejects_unparsable_url() {
        let err = load(&[("SHOPFRONT_API_BASE", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SHOPFRONT_API_BASE"));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(load(&[("SHOPFRONT_API_BASE", "ftp://example.com/api")]).is_err());
    }

    #[test]
    fn test_rejects_invalid_seconds() {
        let err = load(&[("SHOPFRONT_CATALOG_CACHE_TTL_SECS", "five")]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SHOPFRONT_CATALOG_CACHE_TTL_SECS")
        );
    }

    #[test]
    fn test_blank_data_dir_uses_default() {
        let config = load(&[("SHOPFRONT_DATA_DIR", "  ")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".shopfront"));
    }
}
