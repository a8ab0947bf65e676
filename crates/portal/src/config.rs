//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BRIEF_API_URL` - Base URL of the Brief Bulletin REST API (http or https)
//!
//! ## Optional
//! - `BRIEF_API_TIMEOUT_SECS` - Per-request timeout for API calls (default: 15)
//! - `PORTAL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORTAL_PORT` - Listen port (default: 3000)
//! - `PORTAL_BASE_URL` - Public URL of the portal (default: <http://localhost:3000>)
//! - `PORTAL_GUEST_LOGIN` / `PORTAL_GUEST_PASSWORD` - Shared guest account;
//!   "Continue as guest" is offered only when both are set
//! - `PORTAL_STATIC_DIR` - Static asset directory (default: crates/portal/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Portal application configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Brief Bulletin REST API base URL
    pub api_url: Url,
    /// Timeout applied to every API request
    pub api_timeout: Duration,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the portal
    pub base_url: String,
    /// Shared guest account, if enabled
    pub guest: Option<GuestCredentials>,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Credentials for "Continue as guest".
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct GuestCredentials {
    pub login: String,
    pub password: SecretString,
}

impl std::fmt::Debug for GuestCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestCredentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl PortalConfig {
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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let api_url = parse_api_url(&env.required("BRIEF_API_URL")?)?;
        let api_timeout = Duration::from_secs(env.parsed("BRIEF_API_TIMEOUT_SECS", 15)?);
        let host = env.parsed("PORTAL_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parsed("PORTAL_PORT", 3000)?;
        let base_url = env.or_default("PORTAL_BASE_URL", "http://localhost:3000");
        Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("PORTAL_BASE_URL".to_string(), e.to_string()))?;

        let guest = match (
            env.optional("PORTAL_GUEST_LOGIN"),
            env.optional("PORTAL_GUEST_PASSWORD"),
        ) {
            (Some(login), Some(password)) => Some(GuestCredentials {
                login,
                password: SecretString::from(password),
            }),
            _ => None,
        };

        Ok(Self {
            api_url,
            api_timeout,
            host,
            port,
            base_url,
            guest,
            static_dir: PathBuf::from(env.or_default("PORTAL_STATIC_DIR", "crates/portal/static")),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parsed("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// How long a started API call keeps its in-flight guard. A call cannot
    /// outlive the client timeout, so an older guard belongs to a request
    /// that was abandoned.
    #[must_use]
    pub fn in_flight_hold(&self) -> TimeDelta {
        TimeDelta::from_std(self.api_timeout).unwrap_or(TimeDelta::MAX)
    }

    /// Configuration for tests: API at `api_url`, everything else default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn for_api(api_url: &str) -> Result<Self, ConfigError> {
        let api_url = api_url.to_owned();
        Self::from_lookup(move |key| (key == "BRIEF_API_URL").then(|| api_url.clone()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse the API base URL. A trailing slash is added so relative endpoint
/// paths join under it instead of replacing the last segment.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("BRIEF_API_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
