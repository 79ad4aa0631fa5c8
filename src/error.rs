//! Error taxonomy for session and token operations.
//!
//! ERROR HANDLING
//! ==============
//! Every variant is caught at the service/coordinator boundary and turned into
//! a failed [`crate::OperationResult`] carrying the `Display` text. Nothing in
//! this crate retries; `retryable` is a hint for callers and log consumers.

/// Machine-readable classification attached to log events.
pub trait ErrorCode {
    /// Stable error code (e.g. `"E_TRANSPORT"`).
    fn error_code(&self) -> &'static str;

    /// Whether a caller could reasonably try the same operation again.
    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Network or protocol failure that cannot be interpreted.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend rejected the credentials or refresh token.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The backend reported success but the token pair is missing or empty.
    #[error("Invalid token received.")]
    MalformedToken(String),

    /// An empty or whitespace-only token was handed to the session store.
    #[error("access token and refresh token must not be empty")]
    InvalidToken,

    /// The operation needs an authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The credential store failed to read or write.
    #[error("credential store error: {0}")]
    Store(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Rejected { .. } => "E_REJECTED",
            Self::MalformedToken(_) => "E_MALFORMED_TOKEN",
            Self::InvalidToken => "E_INVALID_TOKEN",
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::Store(_) => "E_STORE",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Rejected { status: 429 | 500..=599, .. })
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
