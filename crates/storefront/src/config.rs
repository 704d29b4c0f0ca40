//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `FATMAC_API_URL` - Base URL of the marketplace REST API (default: `http://127.0.0.1:8000/api`)
//! - `FATMAC_API_TOKEN` - Bearer token sent with API requests
//! - `FATMAC_DATA_DIR` - Directory backing the local key-value store (default: `.fatmac`)
//! - `FATMAC_CART_KEY` - Key the cart is persisted under (default: `fatmac_cart`)
//! - `FATMAC_SEARCH_DEBOUNCE_MS` - Search box debounce in milliseconds (default: 500)
//! - `FATMAC_CACHE_TTL_SECS` - Lifetime of cached API responses (default: 300)
//! - `FATMAC_HTTP_TIMEOUT_SECS` - Per-request HTTP timeout (default: 15)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_DATA_DIR: &str = ".fatmac";

/// Key the cart lives under in the key-value store.
pub const DEFAULT_CART_KEY: &str = "fatmac_cart";

/// Delay between the last keystroke in the search box and the query write.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Marketplace REST API settings
    pub api: ApiConfig,
    /// Directory backing the file key-value store
    pub data_dir: PathBuf,
    /// Key the cart is persisted under
    pub cart_key: String,
    /// Search box debounce
    pub search_debounce: Duration,
}

/// Marketplace REST API configuration.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.fatmac.pe/api`
    pub base_url: Url,
    /// Optional bearer token for authenticated endpoints
    pub token: Option<SecretString>,
    /// Lifetime of cached listing and product responses
    pub cache_ttl: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("cache_ttl", &self.cache_ttl)
            .field("timeout", &self.timeout)
            .finish()
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

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("FATMAC_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_base_url(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("FATMAC_API_URL".to_string(), e.to_string())
        })?;

        let token = lookup("FATMAC_API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);

        let api = ApiConfig {
            base_url,
            token,
            cache_ttl: Duration::from_secs(parse_u64(&lookup, "FATMAC_CACHE_TTL_SECS", 300)?),
            timeout: Duration::from_secs(parse_u64(&lookup, "FATMAC_HTTP_TIMEOUT_SECS", 15)?),
        };

        let cart_key = lookup("FATMAC_CART_KEY").unwrap_or_else(|| DEFAULT_CART_KEY.to_string());
        if cart_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "FATMAC_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            api,
            data_dir: lookup("FATMAC_DATA_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
            cart_key,
            search_debounce: Duration::from_millis(parse_u64(
                &lookup,
                "FATMAC_SEARCH_DEBOUNCE_MS",
                500,
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, making sure joins keep the `/api` prefix.
fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get an unsigned integer variable with a default value.
fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://127.0.0.1:8000/api/");
        assert!(config.api.token.is_none());
        assert_eq!(config.cart_key, "fatmac_cart");
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.api.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.data_dir, PathBuf::from(".fatmac"));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("FATMAC_API_URL", "https://api.fatmac.pe/api/"),
            ("FATMAC_API_TOKEN", "tok_123"),
            ("FATMAC_SEARCH_DEBOUNCE_MS", "250"),
            ("FATMAC_CART_KEY", "cart_v2"),
            ("FATMAC_DATA_DIR", "/tmp/fatmac"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url.as_str(), "https://api.fatmac.pe/api/");
        assert_eq!(
            config.api.token.as_ref().unwrap().expose_secret(),
            "tok_123"
        );
        assert_eq!(config.search_debounce, Duration::from_millis(250));
        assert_eq!(config.cart_key, "cart_v2");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/fatmac"));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[(
            "FATMAC_SEARCH_DEBOUNCE_MS",
            "soon",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "FATMAC_SEARCH_DEBOUNCE_MS"));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err =
            StorefrontConfig::from_lookup(lookup_from(&[("FATMAC_API_URL", "not a url")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "FATMAC_API_URL"));
    }

    #[test]
    fn test_blank_cart_key_is_rejected() {
        let result = StorefrontConfig::from_lookup(lookup_from(&[("FATMAC_CART_KEY", "  ")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config =
            StorefrontConfig::from_lookup(lookup_from(&[("FATMAC_API_TOKEN", " ")])).unwrap();
        assert!(config.api.token.is_none());
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let mut config = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap().api;
        config.token = Some(SecretString::from("super_secret_token"));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("127.0.0.1:8000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
