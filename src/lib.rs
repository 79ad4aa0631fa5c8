//! Client-side session and token manager for tenant-scoped backends.
//!
//! SYSTEM CONTEXT
//! ==============
//! Exchanges user credentials for an access/refresh token pair, tracks the
//! current authentication state, and renews the access token through a single
//! refresh slot so concurrent callers never race each other against a backend
//! with short token lifetimes.
//!
//! ARCHITECTURE
//! ============
//! - [`state::SessionStore`] owns the authoritative in-memory session view.
//! - [`refresh::RefreshCoordinator`] serializes refresh calls on one permit.
//! - [`auth::AuthenticationService`] orchestrates login, logout and refresh.
//!
//! The HTTP transport, credential persistence and navigation are collaborators
//! behind traits ([`transport::Transport`], [`store::CredentialStore`],
//! [`navigation::Navigator`]).

pub mod auth;
pub mod claims;
pub mod config;
pub mod error;
pub mod navigation;
pub mod refresh;
pub mod result;
pub mod state;
pub mod store;
pub mod transport;
pub mod types;

pub use auth::AuthenticationService;
pub use config::AuthConfig;
pub use error::{AuthError, ErrorCode};
pub use navigation::{Navigator, TracingNavigator};
pub use refresh::{RefreshCoordinator, RefreshPermit, RefreshPhase};
pub use result::OperationResult;
pub use state::{SessionState, SessionStore};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use types::{AuthProvider, Credentials, RefreshRequest, TokenPair};
