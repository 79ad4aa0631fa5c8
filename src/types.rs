//! Credentials, token pairs and the wire shapes exchanged with the token service.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::state::SessionState;

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Login input. Created per attempt and never persisted.
///
/// The tenant travels as a request header, not in the body.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    #[serde(skip)]
    pub tenant: String,
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    #[must_use]
    pub fn new(tenant: impl Into<String>, identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { tenant: tenant.into(), identifier: identifier.into(), secret: secret.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant", &self.tenant)
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// TOKEN PAIR
// =============================================================================

/// A validated access/refresh token pair. Both fields are non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    /// Build a pair, rejecting empty or whitespace-only tokens.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if either token is blank.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Result<Self, AuthError> {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();
        if is_blank(&access_token) || is_blank(&refresh_token) {
            return Err(AuthError::InvalidToken);
        }
        Ok(Self { access_token, refresh_token })
    }

    /// Whether both tokens are non-blank.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !is_blank(&self.access_token) && !is_blank(&self.refresh_token)
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// =============================================================================
// REFRESH REQUEST
// =============================================================================

/// Body of the refresh exchange: `{"refreshToken": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl RefreshRequest {
    #[must_use]
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self { refresh_token: refresh_token.into() }
    }

    /// Derive a request from the session. `None` when no refresh token is held.
    #[must_use]
    pub fn from_state(state: &SessionState) -> Option<Self> {
        if is_blank(&state.refresh_token) {
            None
        } else {
            Some(Self::new(state.refresh_token.clone()))
        }
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

/// Authentication scheme implemented by a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Jwt,
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Token service response. Fields are optional so a missing token surfaces as
/// [`AuthError::MalformedToken`] instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TryFrom<TokenResponse> for TokenPair {
    type Error = AuthError;

    fn try_from(resp: TokenResponse) -> Result<Self, Self::Error> {
        let access_token = resp.token.unwrap_or_default();
        let refresh_token = resp.refresh_token.unwrap_or_default();
        if is_blank(&access_token) {
            return Err(AuthError::MalformedToken("token is missing or empty".into()));
        }
        if is_blank(&refresh_token) {
            return Err(AuthError::MalformedToken("refreshToken is missing or empty".into()));
        }
        Ok(Self { access_token, refresh_token })
    }
}

/// Error body returned by the token service on a rejected exchange.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorEnvelope {
    /// Most specific human-readable message the envelope carries.
    pub fn message(&self) -> Option<String> {
        let non_blank = |s: &&String| !is_blank(s);
        if let Some(exception) = self.exception.as_ref().filter(non_blank) {
            return Some(exception.clone());
        }
        let messages: Vec<&str> = self.messages.iter().filter(non_blank).map(String::as_str).collect();
        if !messages.is_empty() {
            return Some(messages.join("; "));
        }
        self.detail.as_ref().or(self.title.as_ref()).filter(non_blank).cloned()
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
