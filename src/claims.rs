//! JWT payload decoding.
//!
//! DESIGN
//! ======
//! Only the payload segment is read so the session can learn its tenant and
//! expiry. Signatures are not checked; the backend is the authority.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

use crate::error::AuthError;

pub const TENANT_CLAIM: &str = "tenant";
pub const EXPIRY_CLAIM: &str = "exp";

/// Flattened claim set: every value rendered as a string.
pub type Claims = BTreeMap<String, String>;

/// Decode the payload of a compact JWT (`header.payload.signature`).
///
/// String claims are kept as-is, arrays are joined with `,`, and other values
/// use their JSON text.
///
/// # Errors
///
/// Returns [`AuthError::MalformedToken`] if the token does not have three
/// segments, the payload is not base64url, or it is not a JSON object.
pub fn decode_claims(token: &str) -> Result<Claims, AuthError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(AuthError::MalformedToken("expected three dot-separated segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {e}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("payload is not JSON: {e}")))?;
    let Value::Object(map) = value else {
        return Err(AuthError::MalformedToken("payload is not a JSON object".into()));
    };

    Ok(map.into_iter().map(|(key, value)| (key, flatten(value))).collect())
}

fn flatten(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) => items.into_iter().map(flatten).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Parse the `exp` claim as Unix seconds.
#[must_use]
pub fn expiry(claims: &Claims) -> Option<i64> {
    match claims.get(EXPIRY_CLAIM)?.parse::<i64>() {
        Ok(exp) => Some(exp),
        Err(_) => None,
    }
}

#[cfg(test)]
#[path = "claims_test.rs"]
mod tests;
