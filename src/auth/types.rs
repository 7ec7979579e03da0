//! Token state types

use crate::config::OAuthConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access/refresh token pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    /// Short-lived token sent with every call
    pub access_token: String,
    /// Long-lived token used to obtain a new access token
    pub refresh_token: String,
    /// When the pair was last renewed; `None` if it came from configuration
    #[serde(default)]
    pub renewed_at: Option<DateTime<Utc>>,
}

impl TokenState {
    /// Create a token pair that has not been renewed yet
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            renewed_at: None,
        }
    }

    /// Create a token pair renewed just now
    pub fn renewed(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            renewed_at: Some(Utc::now()),
        }
    }
}

impl std::fmt::Debug for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenState")
            .field("renewed_at", &self.renewed_at)
            .finish_non_exhaustive()
    }
}

/// What the OAuth server needs to know about the application
#[derive(Clone, PartialEq, Eq)]
pub struct AppCredentials {
    /// Application ID (`client_id`)
    pub app_id: String,
    /// Application secret (`client_secret`)
    pub app_secret: String,
    /// Token endpoint
    pub oauth_url: String,
}

impl From<&OAuthConfig> for AppCredentials {
    fn from(config: &OAuthConfig) -> Self {
        Self {
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            oauth_url: config.oauth_url.clone(),
        }
    }
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("oauth_url", &self.oauth_url)
            .finish_non_exhaustive()
    }
}
