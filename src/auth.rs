//! Authentication service: login, logout and token refresh orchestration.
//!
//! SYSTEM CONTEXT
//! ==============
//! The public seam for the rest of the application. Callers never talk to the
//! refresh coordinator or the session store's write path directly.
//!
//! ERROR HANDLING
//! ==============
//! Every operation returns an [`OperationResult`]; no error escapes as a panic
//! or `Err`. Logout cannot fail from the caller's perspective.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::{AuthError, ErrorCode};
use crate::navigation::Navigator;
use crate::refresh::{RefreshCoordinator, RefreshPermit};
use crate::result::OperationResult;
use crate::state::SessionStore;
use crate::store::CredentialStore;
use crate::transport::{self, Transport};
use crate::types::{AuthProvider, Credentials, RefreshRequest, TokenPair};

pub struct AuthenticationService {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    coordinator: RefreshCoordinator,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    login_redirect: String,
    refresh_threshold_secs: i64,
}

impl AuthenticationService {
    /// Wire a service with a fresh session store and refresh permit.
    #[must_use]
    pub fn new(
        config: &AuthConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(credentials));
        Self::with_session(config, transport, session, navigator, RefreshPermit::new())
    }

    /// Wire a service around an existing session store and permit.
    #[must_use]
    pub fn with_session(
        config: &AuthConfig,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        permit: RefreshPermit,
    ) -> Self {
        let coordinator = RefreshCoordinator::new(permit, session.clone(), transport.clone(), config.refresh_path.clone());
        Self {
            transport,
            session,
            coordinator,
            navigator,
            login_path: config.login_path.clone(),
            login_redirect: config.login_redirect.clone(),
            refresh_threshold_secs: i64::try_from(config.refresh_threshold.as_secs()).unwrap_or(i64::MAX),
        }
    }

    #[must_use]
    pub fn provider_type(&self) -> AuthProvider {
        AuthProvider::Jwt
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Exchange credentials for a token pair and mark the user logged in.
    ///
    /// The tenant header comes from `credentials`, not from the session.
    pub async fn login(&self, credentials: &Credentials) -> OperationResult<()> {
        let exchanged =
            transport::exchange_tokens(self.transport.as_ref(), &self.login_path, &credentials.tenant, credentials).await;

        let tokens = match exchanged {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(tenant = %credentials.tenant, error = %e, code = e.error_code(), "login failed");
                return OperationResult::fail(e.to_string());
            }
        };

        match self
            .session
            .mark_logged_in_for(&credentials.tenant, &tokens.access_token, &tokens.refresh_token)
            .await
        {
            Ok(()) => OperationResult::empty(),
            Err(e) => OperationResult::fail(e.to_string()),
        }
    }

    /// Clear the session and redirect to the login screen. Always succeeds.
    pub async fn logout(&self) -> OperationResult<()> {
        self.session.mark_logged_out().await;
        self.navigator.go_to(&self.login_redirect);
        OperationResult::empty()
    }

    /// Exchange `request` through the refresh coordinator.
    pub async fn refresh_token(&self, request: RefreshRequest) -> OperationResult<TokenPair> {
        self.coordinator.refresh(request).await
    }

    /// Refresh using the refresh token currently held by the session.
    pub async fn refresh_current(&self) -> OperationResult<TokenPair> {
        match RefreshRequest::from_state(&self.session.current_state()) {
            Some(request) => self.refresh_token(request).await,
            None => OperationResult::fail(AuthError::NotAuthenticated.to_string()),
        }
    }

    /// Return an access token that is not about to expire, refreshing first
    /// if needed.
    ///
    /// A refresh token the backend rejects ends the session (including the
    /// login redirect). Transport and malformed-response failures leave the
    /// session as it was.
    pub async fn ensure_fresh_token(&self) -> OperationResult<String> {
        let state = self.session.current_state();
        if !state.is_authenticated {
            return OperationResult::fail(AuthError::NotAuthenticated.to_string());
        }

        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        if !state.needs_refresh(now, self.refresh_threshold_secs) {
            return OperationResult::success(state.access_token);
        }

        match self.coordinator.refresh_if_stale(now, self.refresh_threshold_secs).await {
            Ok(Some(tokens)) => OperationResult::success(tokens.access_token),
            Ok(None) => {
                let state = self.session.current_state();
                if state.is_authenticated {
                    OperationResult::success(state.access_token)
                } else {
                    OperationResult::fail(AuthError::NotAuthenticated.to_string())
                }
            }
            Err(e @ AuthError::Rejected { .. }) => {
                info!(error = %e, "refresh token rejected; ending session");
                self.logout().await;
                OperationResult::fail(e.to_string())
            }
            Err(e) => OperationResult::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
