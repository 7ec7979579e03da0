//! Client configuration
//!
//! A [`ClientConfig`] selects one of two deployment modes and carries the
//! retry and transport tunables shared by both. It can be built in code or
//! loaded from a YAML/JSON file:
//!
//! ```yaml
//! mode: oauth
//! domain: portal.bitrix24.ru
//! access_token: "..."
//! refresh_token: "..."
//! app_id: local.5f1a...
//! app_secret: "..."
//! retry:
//!   rate_limit_delay_ms: 500
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Well-known OAuth server for Bitrix24 applications
pub const DEFAULT_OAUTH_URL: &str = "https://oauth.bitrix.info/oauth/token/";

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Deployment mode and its credentials
    #[serde(flatten)]
    pub mode: ClientMode,

    /// Value of the `User-Agent` header on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Transport timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry ceilings and backoff
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Optional client-side pacing of outgoing requests
    #[serde(default)]
    pub throttle: Option<ThrottleConfig>,
}

fn default_user_agent() -> String {
    format!("bitrix-rest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_ms() -> u64 {
    30_000
}

/// Deployment mode: exactly one is active per client
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum ClientMode {
    /// Pre-authorized inbound webhook; no token state
    #[serde(rename = "inbound_hook")]
    InboundHook {
        /// Webhook URL, e.g. `https://portal.bitrix24.ru/rest/1/abcdef`
        hook_url: String,
    },

    /// OAuth application with renewable tokens
    #[serde(rename = "oauth")]
    OAuth(OAuthConfig),
}

/// Credentials of an OAuth application installed on a portal
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Portal domain (the `DOMAIN` parameter the app receives)
    pub domain: String,

    /// Current access token
    #[serde(default)]
    pub access_token: String,

    /// Refresh token used to obtain a new access token
    #[serde(default)]
    pub refresh_token: String,

    /// Application ID (`client_id`)
    #[serde(default)]
    pub app_id: String,

    /// Application secret (`client_secret`)
    #[serde(default)]
    pub app_secret: String,

    /// Talk plain HTTP to the portal from the start
    #[serde(default)]
    pub enforce_http: bool,

    /// Token endpoint of the OAuth server
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
}

fn default_oauth_url() -> String {
    DEFAULT_OAUTH_URL.to_string()
}

impl OAuthConfig {
    /// Create OAuth settings for a portal domain
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            access_token: String::new(),
            refresh_token: String::new(),
            app_id: String::new(),
            app_secret: String::new(),
            enforce_http: false,
            oauth_url: default_oauth_url(),
        }
    }

    /// Set the access and refresh tokens
    #[must_use]
    pub fn tokens(
        mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        self.access_token = access_token.into();
        self.refresh_token = refresh_token.into();
        self
    }

    /// Set the application ID and secret
    #[must_use]
    pub fn app(mut self, app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self.app_secret = app_secret.into();
        self
    }

    /// Force plain HTTP
    #[must_use]
    pub fn enforce_http(mut self, enforce: bool) -> Self {
        self.enforce_http = enforce;
        self
    }

    /// Override the OAuth token endpoint
    #[must_use]
    pub fn oauth_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_url = url.into();
        self
    }

    /// REST endpoint derived from the domain and protocol preference
    pub fn endpoint(&self) -> String {
        let scheme = if self.enforce_http { "http" } else { "https" };
        format!("{scheme}://{}/rest/", self.domain)
    }
}

impl std::fmt::Debug for ClientMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InboundHook { hook_url } => f
                .debug_struct("InboundHook")
                .field("hook_url", &redact_hook_url(hook_url))
                .finish(),
            Self::OAuth(oauth) => f.debug_tuple("OAuth").field(oauth).finish(),
        }
    }
}

/// Webhook URL with its secret path segment masked
///
/// `https://portal.bitrix24.ru/rest/1/abcdef` becomes
/// `https://portal.bitrix24.ru/rest/1/***`.
pub(crate) fn redact_hook_url(hook_url: &str) -> String {
    match hook_url.trim_end_matches('/').rsplit_once('/') {
        Some((head, _)) => format!("{head}/***"),
        None => "***".to_string(),
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("domain", &self.domain)
            .field("app_id", &self.app_id)
            .field("enforce_http", &self.enforce_http)
            .field("oauth_url", &self.oauth_url)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Ceilings and delays for the recoverable conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Pause before resending a rate-limited request
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// How many times one request may be resent after `QUERY_LIMIT_EXCEEDED`
    #[serde(default = "default_max_rate_limit_retries")]
    pub max_rate_limit_retries: u32,

    /// How many token renewals one call may trigger
    #[serde(default = "default_max_auth_refreshes")]
    pub max_auth_refreshes: u32,
}

fn default_rate_limit_delay_ms() -> u64 {
    300
}

fn default_max_rate_limit_retries() -> u32 {
    20
}

fn default_max_auth_refreshes() -> u32 {
    2
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            max_rate_limit_retries: default_max_rate_limit_retries(),
            max_auth_refreshes: default_max_auth_refreshes(),
        }
    }
}

impl RetryPolicy {
    /// Pause before resending a rate-limited request
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }
}

// ============================================================================
// Throttle
// ============================================================================

/// Token-bucket pacing applied before every dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

fn default_burst_size() -> u32 {
    1
}

impl Default for ThrottleConfig {
    /// Bitrix24's documented sustained budget of two requests per second
    fn default() -> Self {
        Self {
            requests_per_second: 2,
            burst_size: 2,
        }
    }
}

// ============================================================================
// Construction and Loading
// ============================================================================

impl ClientConfig {
    fn with_mode(mode: ClientMode) -> Self {
        Self {
            mode,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            retry: RetryPolicy::default(),
            throttle: None,
        }
    }

    /// Configuration for an inbound webhook
    pub fn inbound_hook(hook_url: impl Into<String>) -> Self {
        Self::with_mode(ClientMode::InboundHook {
            hook_url: hook_url.into(),
        })
    }

    /// Configuration for an OAuth application
    pub fn oauth(settings: OAuthConfig) -> Self {
        Self::with_mode(ClientMode::OAuth(settings))
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the transport timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enable client-side pacing
    #[must_use]
    pub fn throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Transport timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parse a configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            other => Err(Error::config(format!(
                "Unsupported config file extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Check that the active mode has everything it needs
    pub fn validate(&self) -> Result<()> {
        match &self.mode {
            ClientMode::InboundHook { hook_url } => {
                if hook_url.trim().is_empty() {
                    return Err(Error::missing_field("hook_url"));
                }
                Url::parse(hook_url)?;
            }
            ClientMode::OAuth(oauth) => {
                if oauth.domain.trim().is_empty() {
                    return Err(Error::missing_field("domain"));
                }
                Url::parse(&oauth.endpoint())?;
                Url::parse(&oauth.oauth_url)?;
            }
        }

        if self.user_agent.is_empty() {
            return Err(Error::missing_field("user_agent"));
        }
        if let Some(throttle) = &self.throttle {
            if throttle.requests_per_second == 0 {
                return Err(Error::invalid_value(
                    "throttle.requests_per_second",
                    "must be greater than zero",
                ));
            }
        }
        Ok(())
    }
}
