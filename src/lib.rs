// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # bitrix-rest
//!
//! A lightweight, Rust-native client for the Bitrix24 REST API.
//!
//! ## Features
//!
//! - **Two Modes**: inbound webhooks or OAuth applications with renewable tokens
//! - **Token Refresh**: `expired_token` / `NO_AUTH_FOUND` renew the pair and replay the call
//! - **Rate Limits**: `QUERY_LIMIT_EXCEEDED` backs off and resends the same request
//! - **Batches**: up to 50 named sub-calls in one request
//! - **Async and Blocking**: one engine behind both client flavours
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bitrix_rest::{Client, ClientConfig, OAuthConfig, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::oauth(
//!         OAuthConfig::new("portal.bitrix24.ru")
//!             .tokens("access", "refresh")
//!             .app("local.5f1a", "secret"),
//!     );
//!     let client = Client::new(config)?;
//!
//!     let deal = client.call("crm.deal.get", json!({"id": 42})).await?;
//!     println!("{}", deal["result"]["TITLE"]);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │           Client / blocking::Client   (facades)              │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────────┴───────────┬───────────────────┐
//! │   Batch   │          CallEngine          │       Auth        │
//! ├───────────┼──────────────────────────────┼───────────────────┤
//! │ BatchSpec │ resolve URI, inject token    │ TokenManager      │
//! │ encode    │ rate-limit backoff           │ refresh grant     │
//! │ Response  │ renew and replay, downgrade  │ atomic swap       │
//! └───────────┴──────────────┬───────────────┴───────────────────┘
//!                            │
//!             ┌──────────────┴─────────────────┐
//!             │ Transport · Sleeper · Throttle │
//!             └────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and reserved wire names
pub mod types;

/// Client configuration
pub mod config;

/// Transport, suspension and pacing capabilities
pub mod http;

/// OAuth token state and renewal
pub mod auth;

/// Batch encoding and response splitting
pub mod batch;

/// Request/response lifecycle
pub mod engine;

/// Async client facade
pub mod client;

/// Blocking client facade
pub mod blocking;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use batch::{BatchResponse, BatchSpec};
pub use client::Client;
pub use config::{ClientConfig, ClientMode, OAuthConfig, RetryPolicy, ThrottleConfig};
pub use error::{Error, ErrorKind, Result};
pub use types::{CallResult, JsonObject, JsonValue};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
