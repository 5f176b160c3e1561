//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FRANCO_API_URL` - Base URL of the Franco Sport backend API (e.g. `https://api.francosport.com/api`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_SESSION_DATABASE_URL` - `SQLite` URL for the session store
//!   (default: `sqlite://franco-sport-sessions.db?mode=rwc`)
//! - `STOREFRONT_PROOF_MAX_BYTES` - Largest accepted payment proof image (default: 5 MiB)
//! - `STOREFRONT_PROOF_TTL_SECS` - How long an attached proof is kept in memory (default: 1800)
//! - `STOREFRONT_PROOF_CACHE_BYTES` - Total bytes of proof images held at once (default: 256 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_DATABASE_URL: &str = "sqlite://franco-sport-sessions.db?mode=rwc";
const DEFAULT_PROOF_MAX_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_PROOF_TTL_SECS: u64 = 30 * 60;
const DEFAULT_PROOF_CACHE_BYTES: u64 = 256 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
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
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session store connection URL
    pub session_database_url: SecretString,
    /// Backend API configuration
    pub api: BackendConfig,
    /// Payment proof handling
    pub proofs: ProofConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Franco Sport backend API configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL every endpoint path is appended to. Never ends with `/`.
    pub base_url: Url,
}

/// Limits for payment proof images held during checkout.
#[derive(Debug, Clone, Copy)]
pub struct ProofConfig {
    /// Largest accepted image, in bytes
    pub max_bytes: usize,
    /// How long an attached image stays in memory without being submitted
    pub ttl: Duration,
    /// Total image bytes held across all checkouts; oldest entries are evicted past this
    pub cache_bytes: u64,
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_PROOF_MAX_BYTES,
            ttl: Duration::from_secs(DEFAULT_PROOF_TTL_SECS),
            cache_bytes: DEFAULT_PROOF_CACHE_BYTES,
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
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let session_database_url = SecretString::from(get_env_or_default(
            "STOREFRONT_SESSION_DATABASE_URL",
            DEFAULT_SESSION_DATABASE_URL,
        ));

        let api = BackendConfig::from_env()?;
        let proofs = ProofConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            session_database_url,
            api,
            proofs,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("FRANCO_API_URL")?;
        Ok(Self {
            base_url: parse_base_url("FRANCO_API_URL", &raw)?,
        })
    }

    /// Build a config directly from a base URL string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("FRANCO_API_URL", base_url)?,
        })
    }

    /// Join an endpoint path (starting with `/`) onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

impl ProofConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let max_bytes = get_optional_env("STOREFRONT_PROOF_MAX_BYTES")
            .map(|raw| parse_value::<usize>("STOREFRONT_PROOF_MAX_BYTES", &raw))
            .transpose()?
            .unwrap_or(defaults.max_bytes);
        let ttl = get_optional_env("STOREFRONT_PROOF_TTL_SECS")
            .map(|raw| parse_value::<u64>("STOREFRONT_PROOF_TTL_SECS", &raw))
            .transpose()?
            .map_or(defaults.ttl, Duration::from_secs);
        let cache_bytes = get_optional_env("STOREFRONT_PROOF_CACHE_BYTES")
            .map(|raw| parse_value::<u64>("STOREFRONT_PROOF_CACHE_BYTES", &raw))
            .transpose()?
            .unwrap_or(defaults.cache_bytes);

        Ok(Self {
            max_bytes,
            ttl,
            cache_bytes,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the backend base URL, accepting only http and https.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}
