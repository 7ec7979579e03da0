//! Blocking client
//!
//! Wraps the async [`crate::Client`] in a private current-thread runtime so the
//! same engine serves synchronous code. Do not use it from inside an async
//! runtime; call the async client there instead.

use crate::auth::TokenState;
use crate::batch::BatchSpec;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{Sleeper, Transport};
use crate::types::{CallResult, JsonValue};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

/// Blocking Bitrix24 REST client
#[derive(Debug)]
pub struct Client {
    inner: crate::Client,
    runtime: Runtime,
}

impl Client {
    /// Create a client with the default transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            inner: crate::Client::new(config)?,
            runtime: new_runtime()?,
        })
    }

    /// Create a client with custom transport and suspension capabilities
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self> {
        Ok(Self {
            inner: crate::Client::with_parts(config, transport, sleeper)?,
            runtime: new_runtime()?,
        })
    }

    /// Call a REST method, blocking until it completes
    pub fn call(&self, method: &str, params: JsonValue) -> CallResult {
        self.runtime.block_on(self.inner.call(method, params))
    }

    /// Execute a batch of named sub-calls, blocking until it completes
    pub fn call_batch(&self, batch: &BatchSpec) -> CallResult {
        self.runtime.block_on(self.inner.call_batch(batch))
    }

    /// Renew the OAuth token pair now
    pub fn renew_tokens(&self) -> Result<()> {
        self.runtime.block_on(self.inner.renew_tokens())
    }

    /// Current token pair, `None` for inbound webhooks
    pub fn tokens(&self) -> Option<TokenState> {
        self.runtime.block_on(self.inner.tokens())
    }

    /// Base URL calls are currently sent to
    pub fn endpoint(&self) -> String {
        self.runtime.block_on(self.inner.endpoint())
    }
}

fn new_runtime() -> Result<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}
