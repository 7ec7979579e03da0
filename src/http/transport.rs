//! Transport adapter
//!
//! Sends one HTTP request and reports what came back. Transport failures are
//! reduced to the two classes the engine reacts to differently: read timeouts
//! (terminal) and everything else, including a connect or TLS handshake that
//! times out (eligible for the scheme downgrade).

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{JsonValue, StringMap};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Status and raw body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl TransportResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure to obtain any response at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connected, but no response within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established or was broken
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Capability to send HTTP requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `uri`
    async fn post_json(
        &self,
        uri: &str,
        body: &JsonValue,
        headers: &StringMap,
    ) -> std::result::Result<TransportResponse, TransportError>;

    /// GET `uri` with the given query parameters
    async fn get_query(
        &self,
        uri: &str,
        query: &[(&str, &str)],
        headers: &StringMap,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// Default transport on top of `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given connect and read timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        // The overall bound covers a connect phase and a read phase
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .timeout(timeout.saturating_mul(2))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Create a transport from client configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.request_timeout())
    }

    async fn execute(
        &self,
        mut req: RequestBuilder,
        headers: &StringMap,
    ) -> std::result::Result<TransportResponse, TransportError> {
        for (key, value) in headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        debug!(status, bytes = body.len(), "Received response");

        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(
        &self,
        uri: &str,
        body: &JsonValue,
        headers: &StringMap,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.execute(self.client.post(uri).json(body), headers).await
    }

    async fn get_query(
        &self,
        uri: &str,
        query: &[(&str, &str)],
        headers: &StringMap,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.execute(self.client.get(uri).query(query), headers).await
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    // The caller reports the URI itself; webhook URLs must not leak through here
    let e = e.without_url();
    // A connect timeout is also a timeout; it must stay a connection failure
    if e.is_connect() {
        TransportError::Connection(e.to_string())
    } else if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(e.to_string())
    }
}
