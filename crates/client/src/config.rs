//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ATELIER_API_URL` - Backend base URL (default: `http://localhost:3000/api`)
//! - `ATELIER_SESSION_FILE` - Where the session token and user are persisted
//!   (default: `.atelier/session.json`)
//! - `ATELIER_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `ATELIER_CATALOG_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

const DEFAULT_SESSION_FILE: &str = ".atelier/session.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL. Always ends with `/`.
    pub api_url: Url,
    /// File backing the persisted session.
    pub session_file: PathBuf,
    /// Timeout applied to every backend request.
    pub request_timeout: Duration,
    /// How long product listings and details stay cached.
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Configuration for the given backend with every other setting at its
    /// default.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url: with_trailing_slash(api_url),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
            sentry_dsn: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("ATELIER_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("ATELIER_API_URL".to_string(), e))?;
        let session_file =
            PathBuf::from(get_env_or_default("ATELIER_SESSION_FILE", DEFAULT_SESSION_FILE));
        let request_timeout = get_duration_secs(
            "ATELIER_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let catalog_cache_ttl = get_duration_secs(
            "ATELIER_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_url,
            session_file,
            request_timeout,
            catalog_cache_ttl,
            sentry_dsn,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the backend base URL.
///
/// Only `http` and `https` are accepted. A trailing `/` is added so that
/// endpoint paths extend the base path instead of replacing its last segment.
fn parse_api_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.cannot_be_a_base() {
        return Err("URL cannot be used as a base".to_string());
    }
    Ok(with_trailing_slash(url))
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Parse a whole, non-zero number of seconds.
fn parse_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn get_duration_secs(key: &str, default: u64) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or_else(
        || Ok(Duration::from_secs(default)),
        |raw| parse_secs(key, &raw),
    )
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_adds_trailing_slash() {
        let url = parse_api_url("http://localhost:3000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/");

        let url = parse_api_url("https://shop.test/api/").unwrap();
        assert_eq!(url.as_str(), "https://shop.test/api/");
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        assert!(parse_api_url("ftp://shop.test/api").is_err());
        assert!(parse_api_url("mailto:ops@shop.test").is_err());
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("K", " 45 ").unwrap(), Duration::from_secs(45));
        assert!(matches!(
            parse_secs("K", "0"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            parse_secs("K", "soon"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new(Url::parse("http://127.0.0.1:9000/v1").unwrap());
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:9000/v1/");
        assert_eq!(config.session_file, PathBuf::from(".atelier/session.json"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert!(config.sentry_dsn.is_none());
    }
}
