//! Session state and its single authoritative store.
//!
//! DESIGN
//! ======
//! `SessionStore` publishes `SessionState` snapshots through a `watch` channel:
//! readers take a cheap synchronous snapshot, subscribers are woken on every
//! change. Writers serialize on one async mutex held across persist + publish,
//! so a reader never observes a new access token paired with an old tenant and
//! the credential store always agrees with the last published snapshot.
//!
//! Token rotation is checked under that same lock: a rotated pair is dropped if
//! the session was logged out or replaced while the refresh call was in flight.
//!
//! TRADE-OFFS
//! ==========
//! Credential-store failures are logged, not surfaced. The in-memory session is
//! authoritative for the process lifetime; persistence only matters for the
//! next start-up.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::claims::{self, Claims, TENANT_CLAIM};
use crate::error::{AuthError, ErrorCode};
use crate::store::CredentialStore;
use crate::types::TokenPair;

// =============================================================================
// SESSION STATE
// =============================================================================

/// Snapshot of who is logged in, and with which tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub tenant: String,
    pub is_authenticated: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub claims: Claims,
}

impl SessionState {
    #[must_use]
    pub fn claim(&self, key: &str) -> Option<&str> {
        self.claims.get(key).map(String::as_str)
    }

    /// Access-token expiry as Unix seconds, when the token carries `exp`.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        claims::expiry(&self.claims)
    }

    /// True when authenticated and the access token expires within
    /// `threshold_secs` of `now`. Tokens without `exp` are never stale.
    #[must_use]
    pub fn needs_refresh(&self, now: i64, threshold_secs: i64) -> bool {
        self.is_authenticated && self.expires_at().is_some_and(|exp| exp.saturating_sub(now) <= threshold_secs)
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// How a token pair enters the session.
#[derive(Debug, Clone, Copy)]
enum Admission<'a> {
    /// First login. Persisted; tenant falls back to the hint.
    Login { tenant_hint: Option<&'a str> },
    /// Rotation of a live session. Rejected once the session has been logged
    /// out, or when its refresh token is no longer `replaces`.
    Rotate { replaces: Option<&'a str> },
    /// Start-up load of an already persisted pair.
    Restore,
}

pub struct SessionStore {
    state: watch::Sender<SessionState>,
    write_lock: Mutex<()>,
    credentials: Arc<dyn CredentialStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state, write_lock: Mutex::new(()), credentials }
    }

    /// Synchronous snapshot of the current session.
    #[must_use]
    pub fn current_state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive a new snapshot after every login, logout and token save.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Record a successful login. Tenant comes from the token's `tenant` claim,
    /// falling back to the currently bound tenant.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if either token is blank.
    pub async fn mark_logged_in(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError> {
        let tokens = TokenPair::new(access_token, refresh_token)?;
        let tenant = self.apply(tokens, Admission::Login { tenant_hint: None }).await?;
        info!(%tenant, "user logged in");
        Ok(())
    }

    /// Like [`Self::mark_logged_in`], with `tenant` used when the token does
    /// not carry a tenant claim.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if either token is blank.
    pub async fn mark_logged_in_for(
        &self,
        tenant: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let tokens = TokenPair::new(access_token, refresh_token)?;
        let tenant = self.apply(tokens, Admission::Login { tenant_hint: Some(tenant) }).await?;
        info!(%tenant, "user logged in");
        Ok(())
    }

    /// Clear the session and the credential store. Never fails; safe to repeat.
    pub async fn mark_logged_out(&self) {
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.credentials.clear().await {
            warn!(error = %e, code = e.error_code(), "credential store clear failed");
        }
        self.state.send_replace(SessionState::default());
        info!("user logged out");
    }

    /// Store a rotated token pair on the live session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if either token is blank and
    /// [`AuthError::NotAuthenticated`] if there is no session to rotate.
    pub async fn save_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError> {
        let tokens = TokenPair::new(access_token, refresh_token)?;
        self.apply(tokens, Admission::Rotate { replaces: None }).await?;
        debug!("session tokens rotated");
        Ok(())
    }

    /// Like [`Self::save_tokens`], but only while the session still holds
    /// `replaced_refresh_token`. A logout or a fresh login in the meantime wins.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if either token is blank and
    /// [`AuthError::NotAuthenticated`] if the session moved on.
    pub async fn save_rotated_tokens(
        &self,
        replaced_refresh_token: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let tokens = TokenPair::new(access_token, refresh_token)?;
        self.apply(tokens, Admission::Rotate { replaces: Some(replaced_refresh_token) }).await?;
        debug!("session tokens rotated");
        Ok(())
    }

    /// Load a previously persisted pair into memory. Returns whether a session
    /// was restored. A blank persisted pair is cleared.
    pub async fn restore(&self) -> bool {
        match self.credentials.get().await {
            Ok(Some(tokens)) if tokens.is_well_formed() => match self.apply(tokens, Admission::Restore).await {
                Ok(tenant) => {
                    info!(%tenant, "session restored");
                    true
                }
                Err(e) => {
                    warn!(error = %e, code = e.error_code(), "session restore failed");
                    false
                }
            },
            Ok(Some(_)) => {
                warn!("persisted token pair is blank; clearing");
                self.mark_logged_out().await;
                false
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "credential store read failed");
                false
            }
        }
    }

    /// Persist and publish `tokens` under the write lock. Returns the tenant
    /// the session is bound to afterwards.
    async fn apply(&self, tokens: TokenPair, admission: Admission<'_>) -> Result<String, AuthError> {
        let claims = match claims::decode_claims(&tokens.access_token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "access token is opaque; no claims derived");
                Claims::new()
            }
        };

        let _guard = self.write_lock.lock().await;
        let current = self.current_state();

        if let Admission::Rotate { replaces } = admission {
            let superseded = replaces.is_some_and(|expected| expected != current.refresh_token);
            if !current.is_authenticated || superseded {
                debug!(superseded, "session changed before rotation; dropping token pair");
                return Err(AuthError::NotAuthenticated);
            }
        }

        let hint = match admission {
            Admission::Login { tenant_hint } => tenant_hint,
            Admission::Rotate { .. } | Admission::Restore => None,
        };
        let tenant = claims
            .get(TENANT_CLAIM)
            .cloned()
            .or_else(|| hint.map(str::to_owned))
            .unwrap_or(current.tenant);

        if !matches!(admission, Admission::Restore) {
            if let Err(e) = self.credentials.set(&tokens).await {
                warn!(error = %e, code = e.error_code(), "credential store write failed");
            }
        }

        self.state.send_replace(SessionState {
            tenant: tenant.clone(),
            is_authenticated: true,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            claims,
        });
        Ok(tenant)
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
