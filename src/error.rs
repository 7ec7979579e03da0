//! Error types for the Bitrix24 REST client
//!
//! Every failure a caller can observe is an [`Error`]. Each variant maps to a
//! machine-readable [`ErrorKind`] and, for the variants that have something
//! useful to add, a small JSON context map for diagnostics.

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Timeout waiting for response from {uri}")]
    Timeout { uri: String },

    #[error("Could not connect to Bitrix24 resource {uri}: {message}")]
    Connection { uri: String, message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String, body: String },

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("OAuth transport failure: {message}")]
    OAuthTransport { message: String },

    #[error("Malformed OAuth response")]
    MalformedOAuthResponse { body: String },

    #[error("Token renewal is not available for inbound webhook clients")]
    RenewalUnavailable,

    // ============================================================================
    // Retry Ceilings
    // ============================================================================
    #[error("Query limit still exceeded after {attempts} retries")]
    RateLimitExhausted { attempts: u32 },

    #[error("Authorization still rejected after {attempts} token renewals")]
    AuthRetriesExhausted { attempts: u32 },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Machine-readable classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid or incomplete client configuration
    Config,
    /// The transport gave up waiting for a response
    Timeout,
    /// The endpoint could not be reached
    ConnectionError,
    /// The response body was not valid JSON
    DecodeError,
    /// The OAuth server could not be reached
    OAuthTransport,
    /// The OAuth server answered without both tokens
    MalformedOAuthResponse,
    /// Renewal requested on a client with no refresh credentials
    RenewalUnavailable,
    /// The rate-limit retry ceiling was reached
    RateLimitExhausted,
    /// The auth-refresh retry ceiling was reached
    AuthRetriesExhausted,
    /// Local I/O failed (config files)
    Io,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a connection error for the attempted URI
    pub fn connection(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Create a decode error carrying the raw body
    pub fn decode(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            body: body.into(),
        }
    }

    /// The machine-readable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_)
            | Error::InvalidUrl(_) => ErrorKind::Config,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Connection { .. } => ErrorKind::ConnectionError,
            Error::Decode { .. } => ErrorKind::DecodeError,
            Error::OAuthTransport { .. } => ErrorKind::OAuthTransport,
            Error::MalformedOAuthResponse { .. } => ErrorKind::MalformedOAuthResponse,
            Error::RenewalUnavailable => ErrorKind::RenewalUnavailable,
            Error::RateLimitExhausted { .. } => ErrorKind::RateLimitExhausted,
            Error::AuthRetriesExhausted { .. } => ErrorKind::AuthRetriesExhausted,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Diagnostic context for this error, if any
    pub fn context(&self) -> Option<JsonObject> {
        let (key, value) = match self {
            Error::Connection { uri, .. } | Error::Timeout { uri } => ("uri", uri),
            Error::Decode { body, .. } => ("body", body),
            Error::MalformedOAuthResponse { body } => ("response", body),
            _ => return None,
        };

        let mut map = JsonObject::new();
        map.insert(key.to_string(), JsonValue::String(value.clone()));
        Some(map)
    }
}

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("hook_url");
        assert_eq!(err.to_string(), "Missing required config field: hook_url");

        let err = Error::Timeout {
            uri: "https://example.bitrix24.ru/rest/profile".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Timeout waiting for response from https://example.bitrix24.ru/rest/profile"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::config("x").kind(), ErrorKind::Config);
        assert_eq!(
            Error::connection("http://x/rest/a", "refused").kind(),
            ErrorKind::ConnectionError
        );
        assert_eq!(Error::decode("bad", "<html>").kind(), ErrorKind::DecodeError);
        assert_eq!(
            Error::MalformedOAuthResponse {
                body: String::new()
            }
            .kind(),
            ErrorKind::MalformedOAuthResponse
        );
        assert_eq!(
            Error::RateLimitExhausted { attempts: 3 }.kind(),
            ErrorKind::RateLimitExhausted
        );
    }

    #[test]
    fn test_error_kind_serde() {
        let json = serde_json::to_string(&ErrorKind::ConnectionError).unwrap();
        assert_eq!(json, "\"connection_error\"");
    }

    #[test]
    fn test_connection_context_carries_uri() {
        let err = Error::connection("http://portal.example/rest/crm.deal.list", "refused");
        let context = err.context().unwrap();
        assert_eq!(context["uri"], "http://portal.example/rest/crm.deal.list");
    }

    #[test]
    fn test_decode_context_carries_body() {
        let err = Error::decode("expected value", "<html>502</html>");
        assert_eq!(err.context().unwrap()["body"], "<html>502</html>");
        assert!(Error::config("x").context().is_none());
    }
}
