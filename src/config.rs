//! Client configuration
//!
//! Credentials and endpoints are injected at construction time (typically
//! from the environment) rather than compiled into the crate.

use crate::OffersError;
use std::env;
use std::time::Duration;

/// Default base URL for the provider's self-service test environment.
pub const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for an [`OffersClient`](crate::OffersClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash
    pub base_url: String,
    /// OAuth2 client id
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Per-request deadline applied to every HTTP call
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with explicit credentials and the default
    /// base URL and timeout.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from the environment.
    ///
    /// Reads `AMADEUS_CLIENT_ID` and `AMADEUS_CLIENT_SECRET` (both required),
    /// `AMADEUS_BASE_URL` (defaults to the provider's test host) and
    /// `AMADEUS_TIMEOUT_SECS` (defaults to 10).
    pub fn from_env() -> Result<Self, OffersError> {
        let client_id = env::var("AMADEUS_CLIENT_ID")
            .map_err(|_| OffersError::Config("AMADEUS_CLIENT_ID is not set".to_string()))?;
        let client_secret = env::var("AMADEUS_CLIENT_SECRET")
            .map_err(|_| OffersError::Config("AMADEUS_CLIENT_SECRET is not set".to_string()))?;

        let base_url =
            env::var("AMADEUS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match env::var("AMADEUS_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                OffersError::Config(format!("AMADEUS_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            client_id,
            client_secret,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
