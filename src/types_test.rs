use super::*;

// =============================================================================
// Credentials
// =============================================================================

#[test]
fn credentials_body_omits_tenant() {
    let creds = Credentials::new("acme", "u", "p");
    let json = serde_json::to_value(&creds).unwrap();
    assert_eq!(json, serde_json::json!({ "identifier": "u", "secret": "p" }));
}

#[test]
fn credentials_debug_redacts_secret() {
    let creds = Credentials::new("acme", "alice", "hunter2");
    let debug = format!("{creds:?}");
    assert!(debug.contains("alice"));
    assert!(!debug.contains("hunter2"));
}

// =============================================================================
// TokenPair
// =============================================================================

#[test]
fn token_pair_rejects_blank_access_token() {
    assert_eq!(TokenPair::new("  ", "r"), Err(AuthError::InvalidToken));
}

#[test]
fn token_pair_rejects_empty_refresh_token() {
    assert_eq!(TokenPair::new("t", ""), Err(AuthError::InvalidToken));
}

#[test]
fn token_pair_accepts_non_blank_tokens() {
    let pair = TokenPair::new("t", "r").unwrap();
    assert!(pair.is_well_formed());
    assert_eq!(pair.access_token, "t");
    assert_eq!(pair.refresh_token, "r");
}

#[test]
fn token_response_with_empty_token_is_malformed() {
    let resp: TokenResponse = serde_json::from_str(r#"{"token":"","refreshToken":"r"}"#).unwrap();
    let err = TokenPair::try_from(resp).unwrap_err();
    assert!(matches!(err, AuthError::MalformedToken(_)));
}

#[test]
fn token_response_missing_refresh_token_is_malformed() {
    let resp: TokenResponse = serde_json::from_str(r#"{"token":"t"}"#).unwrap();
    assert!(matches!(TokenPair::try_from(resp), Err(AuthError::MalformedToken(_))));
}

#[test]
fn token_response_converts_to_pair() {
    let resp: TokenResponse = serde_json::from_str(r#"{"token":"t","refreshToken":"r","refreshTokenExpiryTime":"x"}"#).unwrap();
    assert_eq!(TokenPair::try_from(resp).unwrap(), TokenPair::new("t", "r").unwrap());
}

// =============================================================================
// RefreshRequest
// =============================================================================

#[test]
fn refresh_request_serializes_camel_case() {
    let json = serde_json::to_value(RefreshRequest::new("r1")).unwrap();
    assert_eq!(json, serde_json::json!({ "refreshToken": "r1" }));
}

#[test]
fn refresh_request_from_empty_state_is_none() {
    assert!(RefreshRequest::from_state(&SessionState::default()).is_none());
}

#[test]
fn refresh_request_from_state_uses_current_refresh_token() {
    let state = SessionState { refresh_token: "r9".into(), is_authenticated: true, ..SessionState::default() };
    assert_eq!(RefreshRequest::from_state(&state), Some(RefreshRequest::new("r9")));
}

// =============================================================================
// ErrorEnvelope
// =============================================================================

#[test]
fn envelope_prefers_exception() {
    let env: ErrorEnvelope =
        serde_json::from_str(r#"{"messages":["a"],"exception":"Authentication Failed."}"#).unwrap();
    assert_eq!(env.message().as_deref(), Some("Authentication Failed."));
}

#[test]
fn envelope_joins_messages() {
    let env: ErrorEnvelope = serde_json::from_str(r#"{"messages":["a","","b"]}"#).unwrap();
    assert_eq!(env.message().as_deref(), Some("a; b"));
}

#[test]
fn envelope_falls_back_to_problem_details() {
    let env: ErrorEnvelope = serde_json::from_str(r#"{"title":"Unauthorized"}"#).unwrap();
    assert_eq!(env.message().as_deref(), Some("Unauthorized"));
}

#[test]
fn envelope_without_text_has_no_message() {
    let env: ErrorEnvelope = serde_json::from_str("{}").unwrap();
    assert!(env.message().is_none());
}
