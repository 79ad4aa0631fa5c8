use super::*;
use crate::state::test_helpers::make_jwt;

#[test]
fn decodes_string_and_numeric_claims() {
    let token = make_jwt(&serde_json::json!({ "tenant": "acme", "exp": 1_700_000_000, "email": "a@acme.io" }));
    let claims = decode_claims(&token).unwrap();
    assert_eq!(claims.get(TENANT_CLAIM).map(String::as_str), Some("acme"));
    assert_eq!(claims.get("email").map(String::as_str), Some("a@acme.io"));
    assert_eq!(expiry(&claims), Some(1_700_000_000));
}

#[test]
fn joins_array_claims() {
    let token = make_jwt(&serde_json::json!({ "role": ["admin", "basic"] }));
    let claims = decode_claims(&token).unwrap();
    assert_eq!(claims.get("role").map(String::as_str), Some("admin,basic"));
}

#[test]
fn tolerates_padded_payload() {
    let token = make_jwt(&serde_json::json!({ "tenant": "root" }));
    let mut parts: Vec<String> = token.split('.').map(str::to_owned).collect();
    parts[1].push_str("==");
    let claims = decode_claims(&parts.join(".")).unwrap();
    assert_eq!(claims.get(TENANT_CLAIM).map(String::as_str), Some("root"));
}

#[test]
fn opaque_token_is_malformed() {
    assert!(matches!(decode_claims("t"), Err(AuthError::MalformedToken(_))));
}

#[test]
fn four_segments_are_malformed() {
    assert!(matches!(decode_claims("a.b.c.d"), Err(AuthError::MalformedToken(_))));
}

#[test]
fn non_base64_payload_is_malformed() {
    assert!(matches!(decode_claims("aGVhZGVy.!!!.c2ln"), Err(AuthError::MalformedToken(_))));
}

#[test]
fn non_object_payload_is_malformed() {
    let payload = URL_SAFE_NO_PAD.encode(b"[1,2]");
    let token = format!("e30.{payload}.sig");
    assert!(matches!(decode_claims(&token), Err(AuthError::MalformedToken(_))));
}

#[test]
fn missing_or_non_numeric_expiry_is_none() {
    let mut claims = Claims::new();
    assert_eq!(expiry(&claims), None);
    claims.insert(EXPIRY_CLAIM.into(), "soon".into());
    assert_eq!(expiry(&claims), None);
}
