//! Engine types: where calls go and what credentials they need

use crate::auth::TokenManager;
use crate::config::redact_hook_url;
use tokio::sync::RwLock;
use tracing::warn;

const SECURE_SCHEME: &str = "https://";
const INSECURE_SCHEME: &str = "http://";

/// REST endpoint of a portal whose scheme may be downgraded once
#[derive(Debug)]
pub struct Endpoint {
    url: RwLock<String>,
}

impl Endpoint {
    /// Create an endpoint, e.g. `https://portal.bitrix24.ru/rest/`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: RwLock::new(url.into()),
        }
    }

    /// Current endpoint URL
    pub async fn current(&self) -> String {
        self.url.read().await.clone()
    }

    /// Switch to plain HTTP after a failed secure attempt
    ///
    /// Returns true when a retry on the insecure endpoint is warranted, that
    /// is when `attempted_uri` used the secure scheme. The switch is permanent.
    pub async fn downgrade(&self, attempted_uri: &str) -> bool {
        if !attempted_uri.starts_with(SECURE_SCHEME) {
            return false;
        }

        let mut url = self.url.write().await;
        if let Some(rest) = url.strip_prefix(SECURE_SCHEME) {
            let downgraded = format!("{INSECURE_SCHEME}{rest}");
            warn!(from = %url, to = %downgraded, "Secure connection failed, downgrading to http");
            *url = downgraded;
        }
        true
    }
}

/// Destination of calls, one case per deployment mode
pub enum Target {
    /// Inbound webhook: the URL carries the authorization
    Hook {
        /// Webhook URL without trailing slash
        hook_url: String,
    },
    /// OAuth application: every call carries the access token
    OAuth {
        /// Portal REST endpoint
        endpoint: Endpoint,
        /// Token pair and renewal
        tokens: TokenManager,
    },
}

impl Target {
    /// Create a webhook target
    pub fn hook(hook_url: impl Into<String>) -> Self {
        let hook_url: String = hook_url.into();
        Self::Hook {
            hook_url: hook_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create an OAuth target
    pub fn oauth(endpoint: impl Into<String>, tokens: TokenManager) -> Self {
        Self::OAuth {
            endpoint: Endpoint::new(endpoint),
            tokens,
        }
    }

    /// Full URI of a REST method
    pub async fn resolve_uri(&self, method: &str) -> String {
        match self {
            Self::Hook { hook_url } => format!("{hook_url}/{method}"),
            Self::OAuth { endpoint, .. } => format!("{}{method}", endpoint.current().await),
        }
    }

    /// `uri` as it may appear in logs and errors
    ///
    /// Webhook secrets are masked; OAuth URIs carry none.
    pub fn redact(&self, uri: &str) -> String {
        match self {
            Self::Hook { hook_url } => match uri.strip_prefix(hook_url.as_str()) {
                Some(rest) => format!("{}{rest}", redact_hook_url(hook_url)),
                None => uri.to_string(),
            },
            Self::OAuth { .. } => uri.to_string(),
        }
    }

    /// Whether the access token must be injected into the body
    pub fn needs_credentials(&self) -> bool {
        matches!(self, Self::OAuth { .. })
    }

    /// Token manager, present only for OAuth targets
    pub fn tokens(&self) -> Option<&TokenManager> {
        match self {
            Self::Hook { .. } => None,
            Self::OAuth { tokens, .. } => Some(tokens),
        }
    }

    /// Downgrade the endpoint scheme after a connection failure
    ///
    /// Webhook URLs embed their secret and are never downgraded.
    pub async fn downgrade(&self, attempted_uri: &str) -> bool {
        match self {
            Self::Hook { .. } => false,
            Self::OAuth { endpoint, .. } => endpoint.downgrade(attempted_uri).await,
        }
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hook { hook_url } => f
                .debug_struct("Hook")
                .field("hook_url", &redact_hook_url(hook_url))
                .finish(),
            Self::OAuth { endpoint, tokens } => f
                .debug_struct("OAuth")
                .field("endpoint", endpoint)
                .field("tokens", tokens)
                .finish(),
        }
    }
}
