//! Call engine module
//!
//! Turns one logical call into as many wire requests as it takes.
//!
//! # Overview
//!
//! For every call the engine:
//! - resolves the method URI and injects the current access token
//! - dispatches through the [`Transport`] and decodes the JSON body
//! - resends the identical request while the portal answers
//!   `QUERY_LIMIT_EXCEEDED`, pausing through the [`Sleeper`]
//! - renews the token pair and replays the call on `NO_AUTH_FOUND` /
//!   `expired_token`
//! - retries once over plain HTTP when a secure connection fails
//!
//! Both loops are bounded by the [`RetryPolicy`]; hitting a ceiling is an error.

mod types;

pub use types::{Endpoint, Target};

use crate::auth::{AppCredentials, TokenManager, TokenState};
use crate::batch::BatchSpec;
use crate::config::{ClientConfig, ClientMode, RetryPolicy};
use crate::error::{Error, Result};
use crate::http::{Sleeper, Throttle, Transport, TransportError};
use crate::types::{
    error_code, CallResult, JsonObject, JsonValue, ResponseStatus, StringMap, AUTH_PARAM,
    BATCH_METHOD,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Request/response lifecycle shared by every client flavour
pub struct CallEngine {
    /// Where calls go
    target: Target,
    /// HTTP transport
    transport: Arc<dyn Transport>,
    /// Suspension capability for backoff
    sleeper: Arc<dyn Sleeper>,
    /// Optional client-side pacing
    throttle: Option<Throttle>,
    /// Headers sent with every call
    headers: StringMap,
    /// Retry ceilings and delays
    retry: RetryPolicy,
}

impl CallEngine {
    /// Build an engine for a validated configuration
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self> {
        config.validate()?;

        let target = match &config.mode {
            ClientMode::InboundHook { hook_url } => Target::hook(hook_url.as_str()),
            ClientMode::OAuth(oauth) => Target::oauth(
                oauth.endpoint(),
                TokenManager::new(
                    AppCredentials::from(oauth),
                    TokenState::new(oauth.access_token.as_str(), oauth.refresh_token.as_str()),
                    Arc::clone(&transport),
                    config.user_agent.as_str(),
                ),
            ),
        };

        let mut headers = StringMap::new();
        headers.insert("User-Agent".to_string(), config.user_agent.clone());

        Ok(Self {
            target,
            transport,
            sleeper,
            throttle: config.throttle.as_ref().map(Throttle::new),
            headers,
            retry: config.retry.clone(),
        })
    }

    /// Destination of calls
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Call a REST method
    ///
    /// `params` must be a JSON object or null. Application-level errors other
    /// than the rate-limit and auth-expiry codes are returned as the payload.
    pub async fn call(&self, method: &str, params: JsonValue) -> CallResult {
        let mut params = into_object(params)?;
        let mut renewals = 0;
        let mut downgraded = false;

        'call: loop {
            let uri = self.target.resolve_uri(method).await;
            let mut observed_token = None;
            if self.target.needs_credentials() {
                if let Some(tokens) = self.target.tokens() {
                    let token = tokens.access_token().await;
                    params.insert(AUTH_PARAM.to_string(), JsonValue::String(token.clone()));
                    observed_token = Some(token);
                }
            }
            let body = JsonValue::Object(params.clone());

            let mut rate_limit_retries = 0;
            let payload = loop {
                let payload = match self.send(&uri, &body).await {
                    Ok(payload) => payload,
                    Err(e @ Error::Connection { .. }) if !downgraded => {
                        if self.target.downgrade(&uri).await {
                            downgraded = true;
                            continue 'call;
                        }
                        return Err(e);
                    }
                    Err(e) => return Err(e),
                };

                if ResponseStatus::classify(&payload) != ResponseStatus::RateLimited {
                    break payload;
                }
                if rate_limit_retries >= self.retry.max_rate_limit_retries {
                    return Err(Error::RateLimitExhausted {
                        attempts: rate_limit_retries,
                    });
                }
                rate_limit_retries += 1;
                let delay = self.retry.rate_limit_delay();
                warn!(
                    method,
                    attempt = rate_limit_retries,
                    ?delay,
                    "Query limit exceeded, backing off"
                );
                self.sleeper.sleep(delay).await;
            };

            if ResponseStatus::classify(&payload) != ResponseStatus::AuthExpired {
                return Ok(payload);
            }

            // Webhooks have nothing to renew; the caller gets the payload as is
            let (Some(tokens), Some(observed)) = (self.target.tokens(), observed_token) else {
                return Ok(payload);
            };

            if renewals >= self.retry.max_auth_refreshes {
                return Err(Error::AuthRetriesExhausted { attempts: renewals });
            }
            renewals += 1;
            warn!(
                method,
                code = error_code(&payload).unwrap_or_default(),
                attempt = renewals,
                "Authorization rejected, renewing tokens"
            );
            tokens.renew_if_current(&observed).await?;
        }
    }

    /// Execute a batch of sub-calls in one request
    ///
    /// The payload is returned unchanged; see [`crate::batch::BatchResponse`]
    /// for splitting it per call name.
    pub async fn call_batch(&self, batch: &BatchSpec) -> CallResult {
        let body = batch.encode()?;
        debug!(commands = batch.calls.len(), halt = batch.halt, "Dispatching batch");
        self.call(BATCH_METHOD, body).await
    }

    /// Send one request and decode the body
    async fn send(&self, uri: &str, body: &JsonValue) -> CallResult {
        if let Some(throttle) = &self.throttle {
            throttle.wait().await;
        }

        let shown_uri = self.target.redact(uri);
        debug!(uri = %shown_uri, "Dispatching call");
        let response = self
            .transport
            .post_json(uri, body, &self.headers)
            .await
            .map_err(|e| match e {
                TransportError::Timeout => Error::Timeout {
                    uri: shown_uri.clone(),
                },
                TransportError::Connection(message) => Error::connection(&shown_uri, message),
            })?;

        serde_json::from_str(&response.body).map_err(|e| {
            warn!(uri = %shown_uri, status = response.status, "Response is not valid JSON");
            Error::decode(e.to_string(), response.body)
        })
    }
}

impl std::fmt::Debug for CallEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallEngine")
            .field("target", &self.target)
            .field("retry", &self.retry)
            .field("has_throttle", &self.throttle.is_some())
            .finish_non_exhaustive()
    }
}

fn into_object(params: JsonValue) -> Result<JsonObject> {
    match params {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(JsonObject::new()),
        other => Err(Error::invalid_value(
            "params",
            format!("expected a JSON object, got {other}"),
        )),
    }
}
