//! Async client facade

use crate::auth::TokenState;
use crate::batch::BatchSpec;
use crate::config::ClientConfig;
use crate::engine::{CallEngine, Target};
use crate::error::{Error, Result};
use crate::http::{ReqwestTransport, Sleeper, TokioSleeper, Transport};
use crate::types::{CallResult, JsonValue};
use std::sync::Arc;

/// Bitrix24 REST client
///
/// One instance owns its token pair and endpoint; calls may run concurrently
/// and share both.
#[derive(Debug)]
pub struct Client {
    engine: CallEngine,
}

impl Client {
    /// Create a client with the default reqwest transport and tokio timer
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::from_config(&config)?;
        Self::with_parts(config, Arc::new(transport), Arc::new(TokioSleeper))
    }

    /// Create a client with custom transport and suspension capabilities
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self> {
        Ok(Self {
            engine: CallEngine::new(&config, transport, sleeper)?,
        })
    }

    /// Call a REST method with a JSON object of parameters
    pub async fn call(&self, method: &str, params: JsonValue) -> CallResult {
        self.engine.call(method, params).await
    }

    /// Execute a batch of named sub-calls
    pub async fn call_batch(&self, batch: &BatchSpec) -> CallResult {
        self.engine.call_batch(batch).await
    }

    /// Renew the OAuth token pair now
    pub async fn renew_tokens(&self) -> Result<()> {
        self.engine
            .target()
            .tokens()
            .ok_or(Error::RenewalUnavailable)?
            .renew()
            .await
    }

    /// Current token pair, `None` for inbound webhooks
    pub async fn tokens(&self) -> Option<TokenState> {
        match self.engine.target().tokens() {
            Some(tokens) => Some(tokens.snapshot().await),
            None => None,
        }
    }

    /// Base URL calls are currently sent to
    pub async fn endpoint(&self) -> String {
        match self.engine.target() {
            Target::Hook { hook_url } => hook_url.clone(),
            Target::OAuth { endpoint, .. } => endpoint.current().await,
        }
    }

    /// The underlying call engine
    pub fn engine(&self) -> &CallEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthConfig;
    use crate::error::ErrorKind;
    use crate::testing::{RecordingSleeper, ScriptedTransport};
    use serde_json::json;

    fn client(config: ClientConfig, transport: &ScriptedTransport) -> Client {
        Client::with_parts(
            config,
            Arc::new(transport.clone()),
            Arc::new(RecordingSleeper::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_hook_client_has_no_tokens() {
        let transport = ScriptedTransport::new();
        let client = client(
            ClientConfig::inbound_hook("https://portal.bitrix24.ru/rest/1/abc"),
            &transport,
        );

        assert!(client.tokens().await.is_none());
        assert_eq!(client.endpoint().await, "https://portal.bitrix24.ru/rest/1/abc");
        let err = client.renew_tokens().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenewalUnavailable);
        assert!(transport.gets().is_empty());
    }

    #[tokio::test]
    async fn test_oauth_client_renews_on_demand() {
        let transport = ScriptedTransport::new();
        transport.get_json_reply(json!({"access_token": "a2", "refresh_token": "r2"}));
        let client = client(
            ClientConfig::oauth(OAuthConfig::new("portal.bitrix24.ru").tokens("a1", "r1")),
            &transport,
        );

        assert_eq!(client.tokens().await.unwrap().access_token, "a1");
        client.renew_tokens().await.unwrap();
        let tokens = client.tokens().await.unwrap();
        assert_eq!(tokens.access_token, "a2");
        assert_eq!(tokens.refresh_token, "r2");
        assert!(tokens.renewed_at.is_some());
    }

    #[tokio::test]
    async fn test_endpoint_reflects_downgrade() {
        let transport = ScriptedTransport::new();
        transport
            .post_reply(Err(crate::http::TransportError::Connection("tls".to_string())))
            .post_json_reply(json!({"result": 1}));
        let client = client(
            ClientConfig::oauth(OAuthConfig::new("portal.bitrix24.ru")),
            &transport,
        );

        assert_eq!(client.endpoint().await, "https://portal.bitrix24.ru/rest/");
        client.call("profile", JsonValue::Null).await.unwrap();
        assert_eq!(client.endpoint().await, "http://portal.bitrix24.ru/rest/");
    }
}
