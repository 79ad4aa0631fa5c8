//! Navigation collaborator used to send the user back to the login screen.

/// Fire-and-forget redirect. Implementations must not fail the caller.
pub trait Navigator: Send + Sync {
    fn go_to(&self, path: &str);
}

/// Headless navigator that only records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn go_to(&self, path: &str) {
        tracing::info!(%path, "navigate");
    }
}
