//! Admin API client configuration.
//!
//! One base URL for every collection, a bearer token and a request
//! timeout. Defaults point at a local development server; override via
//! environment variables or explicit construction.

use url::Url;
use zeroize::Zeroizing;

/// Default base URL when `MEC_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api/v1";

/// Default request timeout when `MEC_TIMEOUT_SECS` is unset or invalid.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the admin API.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct AdminApiConfig {
    /// Base URL every endpoint path is appended to,
    /// e.g. `https://admin.example.com/api/v1`.
    pub base_url: Url,
    /// Bearer token for API authentication. Zeroed on drop.
    pub api_token: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AdminApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AdminApiConfig {
    /// Construct from explicit values.
    pub fn new(base_url: &str, token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            api_token: Zeroizing::new(token.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `MEC_API_URL` (default: `http://127.0.0.1:8080/api/v1`)
    /// - `MEC_API_TOKEN` (required)
    /// - `MEC_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("MEC_API_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        if api_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        Ok(Self {
            base_url: env_url("MEC_API_URL", DEFAULT_BASE_URL)?,
            api_token: Zeroizing::new(api_token),
            timeout_secs: std::env::var("MEC_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Configuration for a mock admin API on `127.0.0.1:{port}` with a short
    /// timeout.
    pub fn local_mock(port: u16, token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("localhost", &format!("http://127.0.0.1:{port}/api/v1"))?,
            api_token: Zeroizing::new(token.to_string()),
            timeout_secs: 5,
        })
    }

    /// Replace the base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_url("base_url", base_url)?;
        Ok(self)
    }

    /// Replace the token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.api_token = Zeroizing::new(token.to_string());
        self
    }

    /// Full URL of an endpoint path below the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No token in the environment or on the command line.
    #[error("MEC_API_TOKEN environment variable is required")]
    MissingToken,
    /// A URL setting does not parse.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
