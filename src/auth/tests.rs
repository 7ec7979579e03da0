//! Tests for the auth module

use super::*;
use crate::error::{Error, ErrorKind};
use crate::http::{TransportError, TransportResponse};
use crate::testing::ScriptedTransport;
use serde_json::json;
use std::sync::Arc;

fn credentials() -> AppCredentials {
    AppCredentials {
        app_id: "local.app".to_string(),
        app_secret: "secret".to_string(),
        oauth_url: "https://oauth.example/oauth/token/".to_string(),
    }
}

fn manager(transport: &ScriptedTransport) -> TokenManager {
    TokenManager::new(
        credentials(),
        TokenState::new("access-1", "refresh-1"),
        Arc::new(transport.clone()),
        "bitrix-rest-test",
    )
}

#[tokio::test]
async fn test_renew_replaces_both_tokens() {
    let transport = ScriptedTransport::new();
    transport.get_json_reply(json!({
        "access_token": "access-2",
        "refresh_token": "refresh-2",
        "expires_in": 3600
    }));
    let tokens = manager(&transport);

    tokens.renew().await.unwrap();

    let state = tokens.snapshot().await;
    assert_eq!(state.access_token, "access-2");
    assert_eq!(state.refresh_token, "refresh-2");
    assert!(state.renewed_at.is_some());
}

#[tokio::test]
async fn test_renew_sends_refresh_grant() {
    let transport = ScriptedTransport::new();
    transport.get_json_reply(json!({"access_token": "a", "refresh_token": "r"}));
    let tokens = manager(&transport);

    tokens.renew().await.unwrap();

    let gets = transport.gets();
    assert_eq!(gets.len(), 1);
    assert_eq!(gets[0].uri, "https://oauth.example/oauth/token/");
    let query = &gets[0].query;
    let has = |k: &str, v: &str| query.iter().any(|(qk, qv)| qk == k && qv == v);
    assert!(has("grant_type", "refresh_token"));
    assert!(has("client_id", "local.app"));
    assert!(has("client_secret", "secret"));
    assert!(has("refresh_token", "refresh-1"));
    assert_eq!(gets[0].headers["User-Agent"], "bitrix-rest-test");
}

#[tokio::test]
async fn test_renew_missing_access_token_leaves_state() {
    let transport = ScriptedTransport::new();
    transport.get_json_reply(json!({"refresh_token": "refresh-2"}));
    let tokens = manager(&transport);

    let err = tokens.renew().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedOAuthResponse);
    assert_eq!(tokens.snapshot().await, TokenState::new("access-1", "refresh-1"));
}

#[tokio::test]
async fn test_renew_non_json_is_malformed() {
    let transport = ScriptedTransport::new();
    transport.get_reply(Ok(TransportResponse::new(502, "<html>bad gateway</html>")));
    let tokens = manager(&transport);

    let err = tokens.renew().await.unwrap_err();

    match err {
        Error::MalformedOAuthResponse { body } => assert_eq!(body, "<html>bad gateway</html>"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(tokens.access_token().await, "access-1");
}

#[tokio::test]
async fn test_renew_oauth_error_payload_is_malformed() {
    let transport = ScriptedTransport::new();
    transport.get_json_reply(json!({"error": "invalid_grant", "error_description": "expired"}));
    let tokens = manager(&transport);

    let err = tokens.renew().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedOAuthResponse);
}

#[tokio::test]
async fn test_renew_transport_failure() {
    let transport = ScriptedTransport::new();
    transport.get_reply(Err(TransportError::Connection("refused".to_string())));
    let tokens = manager(&transport);

    let err = tokens.renew().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OAuthTransport);
    assert!(err.to_string().contains("oauth transport failure"));
    assert_eq!(tokens.access_token().await, "access-1");
}

#[tokio::test]
async fn test_renew_if_current_skips_stale_observation() {
    let transport = ScriptedTransport::new();
    transport.get_json_reply(json!({"access_token": "access-2", "refresh_token": "refresh-2"}));
    let tokens = manager(&transport);

    assert!(tokens.renew_if_current("access-1").await.unwrap());
    // A second caller that saw the old token must not renew again
    assert!(!tokens.renew_if_current("access-1").await.unwrap());

    assert_eq!(transport.gets().len(), 1);
    assert_eq!(tokens.access_token().await, "access-2");
}

#[test]
fn test_debug_hides_tokens() {
    let transport = ScriptedTransport::new();
    let tokens = manager(&transport);
    let debug = format!("{tokens:?}");
    assert!(!debug.contains("access-1"));
    assert!(!debug.contains("secret"));
}
