//! Transport collaborator and token-exchange response mapping.
//!
//! DESIGN
//! ======
//! The network is a black box: [`Transport::send`] takes a method, path,
//! headers and JSON body and returns a status plus raw body text. Mapping that
//! response onto a [`TokenPair`] or an [`AuthError`] is pure and lives here so
//! it can be tested without a server.

pub mod http;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::AuthError;
use crate::types::{ErrorEnvelope, TokenPair, TokenResponse};

pub use http::HttpTransport;

/// Header carrying the tenant identifier on every token exchange.
pub const TENANT_HEADER: &str = "tenant";

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Build a `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Transport`] if `body` cannot be serialized.
    pub fn post_json<B: Serialize + ?Sized>(path: &str, body: &B) -> Result<Self, AuthError> {
        let body = serde_json::to_value(body).map_err(|e| AuthError::Transport(format!("request body: {e}")))?;
        Ok(Self { method: Method::POST, path: path.to_owned(), headers: Vec::new(), body: Some(body) })
    }

    /// Set a request-scoped header, replacing any previous value of the same name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Black-box request/response function. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the raw response.
    ///
    /// Only failures to obtain a response are errors; non-2xx statuses are
    /// returned as [`ApiResponse`] values.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Transport`] on connection, timeout or I/O failure.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AuthError>;
}

/// POST `body` to `path` with the tenant header and decode the token pair.
///
/// # Errors
///
/// Propagates transport failures and the mapping errors of [`decode_token_response`].
pub async fn exchange_tokens<B: Serialize + Sync + ?Sized>(
    transport: &dyn Transport,
    path: &str,
    tenant: &str,
    body: &B,
) -> Result<TokenPair, AuthError> {
    let request = ApiRequest::post_json(path, body)?.with_header(TENANT_HEADER, tenant);
    let response = transport.send(request).await?;
    decode_token_response(&response)
}

// =============================================================================
// RESPONSE MAPPING
// =============================================================================

/// Map a token-service response onto a validated pair.
///
/// - 2xx with both tokens present: the pair
/// - 2xx with a missing/empty token: [`AuthError::MalformedToken`]
/// - 2xx with an unparseable body: [`AuthError::Transport`]
/// - 4xx: [`AuthError::Rejected`] with the envelope's message
/// - anything else: [`AuthError::Transport`]
///
/// # Errors
///
/// See the list above.
pub fn decode_token_response(response: &ApiResponse) -> Result<TokenPair, AuthError> {
    if response.is_success() {
        let parsed: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| AuthError::Transport(format!("unexpected response body: {e}")))?;
        return TokenPair::try_from(parsed);
    }

    let message = match serde_json::from_str::<ErrorEnvelope>(&response.body) {
        Ok(envelope) => envelope.message(),
        Err(_) => None,
    };

    if (400..500).contains(&response.status) {
        let message = message.unwrap_or_else(|| format!("request rejected with status {}", response.status));
        return Err(AuthError::Rejected { status: response.status, message });
    }

    Err(AuthError::Transport(match message {
        Some(message) => format!("HTTP {}: {message}", response.status),
        None => format!("HTTP {}", response.status),
    }))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
