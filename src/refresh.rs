//! Refresh coordination: at most one refresh exchange in flight at a time.
//!
//! ARCHITECTURE
//! ============
//! `Idle -> Refreshing -> Idle`. A caller moves the coordinator to
//! `Refreshing` by acquiring the single [`RefreshPermit`]; the permit guard is
//! dropped on every exit path (success, error, transport panic, or the
//! caller's future being cancelled), which moves it back to `Idle`.
//!
//! Waiters are not coalesced: each queued caller runs its own exchange once the
//! permit is free. The tenant header is read from the session only after the
//! permit is held, so it reflects the freshest state.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};

use crate::error::{AuthError, ErrorCode};
use crate::result::OperationResult;
use crate::state::SessionStore;
use crate::transport::{self, Transport};
use crate::types::{RefreshRequest, TokenPair};

// =============================================================================
// PERMIT
// =============================================================================

/// Exclusive refresh slot with capacity one.
///
/// Create one per application session and hand it to the coordinator. Clones
/// share the same slot.
#[derive(Debug, Clone)]
pub struct RefreshPermit {
    slot: Arc<Semaphore>,
}

impl RefreshPermit {
    #[must_use]
    pub fn new() -> Self {
        Self { slot: Arc::new(Semaphore::new(1)) }
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.slot.available_permits() == 0
    }

    async fn acquire(&self) -> Result<SemaphorePermit<'_>, AuthError> {
        self.slot
            .acquire()
            .await
            .map_err(|_| AuthError::Transport("refresh permit closed".into()))
    }
}

impl Default for RefreshPermit {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

// =============================================================================
// COORDINATOR
// =============================================================================

pub struct RefreshCoordinator {
    permit: RefreshPermit,
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    refresh_path: String,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new(
        permit: RefreshPermit,
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        refresh_path: impl Into<String>,
    ) -> Self {
        Self { permit, session, transport, refresh_path: refresh_path.into() }
    }

    #[must_use]
    pub fn phase(&self) -> RefreshPhase {
        if self.permit.is_held() { RefreshPhase::Refreshing } else { RefreshPhase::Idle }
    }

    /// Exchange `request` for a new token pair, one caller at a time.
    ///
    /// On success the new pair is saved to the session before returning. On
    /// failure the session is left untouched.
    pub async fn refresh(&self, request: RefreshRequest) -> OperationResult<TokenPair> {
        self.try_refresh(&request).await.into()
    }

    pub(crate) async fn try_refresh(&self, request: &RefreshRequest) -> Result<TokenPair, AuthError> {
        let _held = self.permit.acquire().await?;
        debug!("refresh permit acquired");
        self.exchange(request).await
    }

    /// Refresh only if the session is still stale once the permit is held.
    ///
    /// The request is derived from the session under the permit, so a caller
    /// queued behind a successful refresh sees the rotated tokens and skips
    /// the exchange. Returns `None` when no exchange was needed.
    pub(crate) async fn refresh_if_stale(&self, now: i64, threshold_secs: i64) -> Result<Option<TokenPair>, AuthError> {
        let _held = self.permit.acquire().await?;
        let state = self.session.current_state();
        if !state.is_authenticated {
            return Err(AuthError::NotAuthenticated);
        }
        if !state.needs_refresh(now, threshold_secs) {
            debug!("token already fresh; skipping refresh");
            return Ok(None);
        }
        let request = RefreshRequest::from_state(&state).ok_or(AuthError::NotAuthenticated)?;
        self.exchange(&request).await.map(Some)
    }

    /// Body of a refresh. Callers must hold the permit.
    ///
    /// The rotated pair is only saved if the session still holds the refresh
    /// token it had when the permit was taken; a logout or re-login that lands
    /// while the call is outstanding wins.
    async fn exchange(&self, request: &RefreshRequest) -> Result<TokenPair, AuthError> {
        let snapshot = self.session.current_state();
        let tenant = snapshot.tenant;
        let call = transport::exchange_tokens(self.transport.as_ref(), &self.refresh_path, &tenant, request);
        let outcome = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthError::Transport("transport panicked".into())),
        };

        let result = match outcome {
            Ok(tokens) => self
                .session
                .save_rotated_tokens(&snapshot.refresh_token, &tokens.access_token, &tokens.refresh_token)
                .await
                .map(|()| tokens),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => info!(%tenant, "access token refreshed"),
            Err(AuthError::NotAuthenticated) => {
                warn!(%tenant, "session ended during refresh; rotated tokens discarded");
            }
            Err(e) => warn!(%tenant, error = %e, code = e.error_code(), retryable = e.retryable(), "token refresh failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
