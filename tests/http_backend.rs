//! End-to-end checks against a local token service.
//!
//! An axum router stands in for the backend: it issues JWTs whose `tenant`
//! claim echoes the tenant header, rejects bad credentials with the backend's
//! error envelope, and tracks how many refresh calls overlap.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tenant_session::{
    AuthConfig, AuthenticationService, Credentials, FileCredentialStore, HttpTransport, MemoryCredentialStore,
    RefreshRequest, TracingNavigator,
};

// =============================================================================
// Mock token service
// =============================================================================

#[derive(Default)]
struct Backend {
    issued: AtomicUsize,
    refresh_in_flight: AtomicUsize,
    refresh_max_in_flight: AtomicUsize,
    refresh_tenants: Mutex<Vec<String>>,
}

fn jwt(tenant: &str) -> String {
    let exp = time::OffsetDateTime::now_utc().unix_timestamp() + 3600;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "tenant": tenant, "exp": exp }).to_string());
    format!("{header}.{payload}.sig")
}

fn tenant_of(headers: &HeaderMap) -> Option<String> {
    headers.get("tenant").and_then(|v| v.to_str().ok()).map(str::to_owned)
}

fn rejected(exception: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({ "messages": [], "exception": exception })))
}

async fn issue_tokens(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(tenant) = tenant_of(&headers) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "messages": ["tenant header missing"] })));
    };
    match (body["identifier"].as_str(), body["secret"].as_str()) {
        (Some("admin"), Some("pw")) => {
            let n = backend.issued.fetch_add(1, Ordering::SeqCst);
            (StatusCode::OK, Json(json!({ "token": jwt(&tenant), "refreshToken": format!("r-{n}") })))
        }
        (Some("broken"), _) => (StatusCode::OK, Json(json!({ "token": "", "refreshToken": "r" }))),
        _ => rejected("Authentication Failed."),
    }
}

async fn refresh_tokens(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let now = backend.refresh_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    backend.refresh_max_in_flight.fetch_max(now, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(15)).await;
    backend.refresh_in_flight.fetch_sub(1, Ordering::SeqCst);

    let tenant = tenant_of(&headers).unwrap_or_default();
    backend.refresh_tenants.lock().unwrap().push(tenant.clone());

    if !body["refreshToken"].as_str().is_some_and(|r| r.starts_with("r-")) {
        return rejected("Invalid Refresh Token.");
    }
    let n = backend.issued.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, Json(json!({ "token": jwt(&tenant), "refreshToken": format!("r-{n}") })))
}

async fn spawn_backend() -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api/tokens", post(issue_tokens))
        .route("/api/tokens/refresh", post(refresh_tokens))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

fn service_for(base_url: &str) -> AuthenticationService {
    let config = AuthConfig::default().with_base_url(base_url).unwrap();
    let transport = Arc::new(HttpTransport::new(&config).unwrap());
    AuthenticationService::new(&config, transport, Arc::new(MemoryCredentialStore::new()), Arc::new(TracingNavigator))
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn login_then_refresh_round_trip() {
    let (base_url, backend) = spawn_backend().await;
    let service = service_for(&base_url);

    let login = service.login(&Credentials::new("acme", "admin", "pw")).await;
    assert!(login.succeeded(), "{:?}", login.error());
    let state = service.session().current_state();
    assert_eq!(state.tenant, "acme");
    assert_eq!(state.refresh_token, "r-0");
    assert!(state.expires_at().is_some());

    let refreshed = service.refresh_current().await;
    assert!(refreshed.succeeded(), "{:?}", refreshed.error());
    assert_eq!(service.session().current_state().refresh_token, "r-1");
    assert_eq!(*backend.refresh_tenants.lock().unwrap(), vec!["acme".to_owned()]);
}

#[tokio::test]
async fn rejected_login_reports_backend_exception() {
    let (base_url, _) = spawn_backend().await;
    let service = service_for(&base_url);

    let result = service.login(&Credentials::new("acme", "admin", "wrong")).await;

    assert_eq!(result.error(), Some("Authentication Failed."));
    assert!(!service.session().current_state().is_authenticated);
}

#[tokio::test]
async fn empty_token_from_backend_is_invalid() {
    let (base_url, _) = spawn_backend().await;
    let service = service_for(&base_url);

    let result = service.login(&Credentials::new("acme", "broken", "pw")).await;

    assert_eq!(result.error(), Some("Invalid token received."));
    assert!(!service.session().current_state().is_authenticated);
}

#[tokio::test]
async fn rejected_refresh_token_keeps_session() {
    let (base_url, _) = spawn_backend().await;
    let service = service_for(&base_url);
    assert!(service.login(&Credentials::new("acme", "admin", "pw")).await.succeeded());

    let result = service.refresh_token(RefreshRequest::new("stolen")).await;

    assert_eq!(result.error(), Some("Invalid Refresh Token."));
    assert!(service.session().current_state().is_authenticated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_refreshes_reach_backend_one_at_a_time() {
    const CALLERS: usize = 6;
    let (base_url, backend) = spawn_backend().await;
    let service = Arc::new(service_for(&base_url));
    assert!(service.login(&Credentials::new("acme", "admin", "pw")).await.succeeded());

    let calls = (0..CALLERS).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.refresh_token(RefreshRequest::new("r-0")).await })
    });
    for result in futures::future::join_all(calls).await {
        assert!(result.unwrap().succeeded());
    }

    assert_eq!(backend.refresh_tenants.lock().unwrap().len(), CALLERS);
    assert_eq!(backend.refresh_max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn persisted_session_survives_restart() {
    let (base_url, _) = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let config = AuthConfig::default().with_base_url(&base_url).unwrap();

    let first = AuthenticationService::new(
        &config,
        Arc::new(HttpTransport::new(&config).unwrap()),
        Arc::new(FileCredentialStore::new(&path)),
        Arc::new(TracingNavigator),
    );
    assert!(first.login(&Credentials::new("acme", "admin", "pw")).await.succeeded());
    let before = first.session().current_state();

    let second = AuthenticationService::new(
        &config,
        Arc::new(HttpTransport::new(&config).unwrap()),
        Arc::new(FileCredentialStore::new(&path)),
        Arc::new(TracingNavigator),
    );
    assert!(second.session().restore().await);
    assert_eq!(second.session().current_state(), before);

    assert!(second.logout().await.succeeded());
    assert!(!path.exists());
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let service = service_for(&format!("http://{addr}"));

    let result = service.login(&Credentials::new("acme", "admin", "pw")).await;

    assert!(!result.succeeded());
    assert!(result.error().is_some_and(|e| e.starts_with("transport error")), "{:?}", result.error());
    assert!(service.logout().await.succeeded());
}
