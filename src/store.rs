//! Credential persistence collaborator.
//!
//! DESIGN
//! ======
//! The session store treats persistence as an opaque key-value slot holding
//! one token pair. Where it lives (browser storage, a file, a keychain) is the
//! implementor's business.

use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::error::AuthError;
use crate::types::TokenPair;

#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the persisted pair, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the backing storage cannot be read.
    async fn get(&self) -> Result<Option<TokenPair>, AuthError>;

    /// Persist `tokens`, replacing any previous pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the backing storage cannot be written.
    async fn set(&self, tokens: &TokenPair) -> Result<(), AuthError>;

    /// Remove the persisted pair. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the backing storage cannot be written.
    async fn clear(&self) -> Result<(), AuthError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<TokenPair>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<TokenPair>, AuthError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn set(&self, tokens: &TokenPair) -> Result<(), AuthError> {
        *self.slot.lock().await = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AuthError> {
        self.slot.lock().await.take();
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Stores the pair as a small JSON document at `path`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<TokenPair>, AuthError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::Store(format!("read {}: {e}", self.path.display()))),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| AuthError::Store(format!("parse {}: {e}", self.path.display())))
    }

    async fn set(&self, tokens: &TokenPair) -> Result<(), AuthError> {
        let raw = serde_json::to_vec_pretty(tokens).map_err(|e| AuthError::Store(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| AuthError::Store(format!("write {}: {e}", self.path.display())))
    }

    async fn clear(&self) -> Result<(), AuthError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Store(format!("remove {}: {e}", self.path.display()))),
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
