//! Common types used throughout the client
//!
//! This module contains shared type aliases, the reserved wire names the
//! platform relies on, and the classification of decoded responses.

use crate::error::Result;
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// Outcome of a single logical call: the decoded payload or a typed failure
pub type CallResult = Result<JsonValue>;

// ============================================================================
// Reserved Names
// ============================================================================

/// Body key the access token is injected under
pub const AUTH_PARAM: &str = "auth";

/// Method name of the server-side batch executor
pub const BATCH_METHOD: &str = "batch";

/// Error code returned when the portal's query budget is exhausted
pub const QUERY_LIMIT_EXCEEDED: &str = "QUERY_LIMIT_EXCEEDED";

/// Error code returned when no credentials were recognized
pub const NO_AUTH_FOUND: &str = "NO_AUTH_FOUND";

/// Error code returned when the access token has expired
pub const EXPIRED_TOKEN: &str = "expired_token";

// ============================================================================
// Response Classification
// ============================================================================

/// What the engine should do with a decoded response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Back off and resend the identical request
    RateLimited,
    /// Renew the access token and replay the call
    AuthExpired,
    /// Hand the payload to the caller untouched
    Done,
}

impl ResponseStatus {
    /// Classify a decoded response body by its `error` field
    pub fn classify(payload: &JsonValue) -> Self {
        match error_code(payload) {
            Some(QUERY_LIMIT_EXCEEDED) => Self::RateLimited,
            Some(NO_AUTH_FOUND | EXPIRED_TOKEN) => Self::AuthExpired,
            _ => Self::Done,
        }
    }
}

/// Extract the application-level error code of a response, if any
pub fn error_code(payload: &JsonValue) -> Option<&str> {
    payload.get("error").and_then(JsonValue::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"error": "QUERY_LIMIT_EXCEEDED"}), ResponseStatus::RateLimited ; "limited")]
    #[test_case(json!({"error": "NO_AUTH_FOUND"}), ResponseStatus::AuthExpired ; "no auth")]
    #[test_case(json!({"error": "expired_token"}), ResponseStatus::AuthExpired ; "expired")]
    #[test_case(json!({"error": "ERROR_METHOD_NOT_FOUND"}), ResponseStatus::Done ; "other error")]
    #[test_case(json!({"result": {"ID": 1}}), ResponseStatus::Done ; "success")]
    #[test_case(json!([1, 2, 3]), ResponseStatus::Done ; "non object")]
    #[test_case(json!({"error": 42}), ResponseStatus::Done ; "non string code")]
    fn test_classify(payload: JsonValue, expected: ResponseStatus) {
        assert_eq!(ResponseStatus::classify(&payload), expected);
    }

    #[test]
    fn test_error_code() {
        assert_eq!(error_code(&json!({"error": "x"})), Some("x"));
        assert_eq!(error_code(&json!({"result": true})), None);
    }
}
