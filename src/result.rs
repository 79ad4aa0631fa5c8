//! Uniform success/failure envelope returned by every public operation.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Outcome of an auth operation.
///
/// A successful result never carries an error; a failed result never carries
/// data. Fields are private so only the constructors below can build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult<T> {
    succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> OperationResult<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self { succeeded: true, data: Some(data), error: None }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self { succeeded: false, data: None, error: Some(message.into()) }
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Convert into a `Result`, yielding the payload (if any) or the message.
    ///
    /// # Errors
    ///
    /// Returns the carried error message when the operation failed.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.succeeded {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}

impl OperationResult<()> {
    /// Success with no payload.
    #[must_use]
    pub fn empty() -> Self {
        Self { succeeded: true, data: None, error: None }
    }
}

impl<T> From<Result<T, AuthError>> for OperationResult<T> {
    fn from(result: Result<T, AuthError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "result_test.rs"]
mod tests;
