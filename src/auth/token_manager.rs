//! Token manager implementation
//!
//! Holds the current token pair and renews it with the refresh-token grant.

use super::types::{AppCredentials, TokenState};
use crate::error::{Error, Result};
use crate::http::{Transport, TransportError};
use crate::types::StringMap;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Owner of a client's OAuth token pair
pub struct TokenManager {
    /// Application credentials and token endpoint
    credentials: AppCredentials,
    /// Current token pair, replaced whole on renewal
    state: RwLock<TokenState>,
    /// Transport for token requests
    transport: Arc<dyn Transport>,
    /// User agent for token requests
    user_agent: String,
}

/// Fields the OAuth server must return on a successful renewal
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

impl TokenManager {
    /// Create a token manager with an initial token pair
    pub fn new(
        credentials: AppCredentials,
        initial: TokenState,
        transport: Arc<dyn Transport>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            state: RwLock::new(initial),
            transport,
            user_agent: user_agent.into(),
        }
    }

    /// Current access token
    pub async fn access_token(&self) -> String {
        self.state.read().await.access_token.clone()
    }

    /// Copy of the current token pair
    pub async fn snapshot(&self) -> TokenState {
        self.state.read().await.clone()
    }

    /// Renew the token pair unconditionally
    pub async fn renew(&self) -> Result<()> {
        let mut state = self.state.write().await;
        self.renew_locked(&mut state).await
    }

    /// Renew the token pair unless it changed since `observed` was read
    ///
    /// Returns `Ok(false)` when another call already renewed the pair, so a
    /// burst of concurrent expiries costs a single round trip.
    pub async fn renew_if_current(&self, observed: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.access_token != observed {
            debug!("Access token already renewed by another call");
            return Ok(false);
        }
        self.renew_locked(&mut state).await?;
        Ok(true)
    }

    async fn renew_locked(&self, state: &mut TokenState) -> Result<()> {
        let query = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.app_id.as_str()),
            ("client_secret", self.credentials.app_secret.as_str()),
            ("refresh_token", state.refresh_token.as_str()),
        ];

        let mut headers = StringMap::new();
        headers.insert("User-Agent".to_string(), self.user_agent.clone());

        let response = self
            .transport
            .get_query(&self.credentials.oauth_url, &query, &headers)
            .await
            .map_err(|e| {
                warn!(error = %e, "OAuth server unreachable");
                Error::OAuthTransport {
                    message: match e {
                        TransportError::Timeout => "oauth transport failure: timeout".to_string(),
                        TransportError::Connection(m) => format!("oauth transport failure: {m}"),
                    },
                }
            })?;

        let tokens: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            warn!(status = response.status, error = %e, "Malformed OAuth response");
            Error::MalformedOAuthResponse {
                body: response.body.clone(),
            }
        })?;

        *state = TokenState::renewed(tokens.access_token, tokens.refresh_token);
        info!("Access token renewed");
        Ok(())
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
