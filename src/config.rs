//! Session client configuration parsed from environment variables.

use std::time::Duration;

use crate::error::AuthError;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOGIN_PATH: &str = "/api/tokens";
pub const DEFAULT_REFRESH_PATH: &str = "/api/tokens/refresh";
pub const DEFAULT_LOGIN_REDIRECT: &str = "/login";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REFRESH_THRESHOLD_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub api_base_url: String,
    pub login_path: String,
    pub refresh_path: String,
    pub login_redirect: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Refresh when the access token expires within this window.
    pub refresh_threshold: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
            login_redirect: DEFAULT_LOGIN_REDIRECT.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            refresh_threshold: Duration::from_secs(DEFAULT_REFRESH_THRESHOLD_SECS),
        }
    }
}

impl AuthConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SESSION_API_BASE_URL`: default `http://127.0.0.1:5000`
    /// - `SESSION_LOGIN_PATH`: default `/api/tokens`
    /// - `SESSION_REFRESH_PATH`: default `/api/tokens/refresh`
    /// - `SESSION_LOGIN_REDIRECT`: default `/login`
    /// - `SESSION_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SESSION_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SESSION_REFRESH_THRESHOLD_SECS`: default 60
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ConfigParse`] if the base URL is not http(s).
    pub fn from_env() -> Result<Self, AuthError> {
        let api_base_url = parse_base_url(&env_or("SESSION_API_BASE_URL", DEFAULT_API_BASE_URL))?;
        Ok(Self {
            api_base_url,
            login_path: normalize_path(&env_or("SESSION_LOGIN_PATH", DEFAULT_LOGIN_PATH)),
            refresh_path: normalize_path(&env_or("SESSION_REFRESH_PATH", DEFAULT_REFRESH_PATH)),
            login_redirect: env_or("SESSION_LOGIN_REDIRECT", DEFAULT_LOGIN_REDIRECT),
            request_timeout: Duration::from_secs(env_parse("SESSION_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)),
            connect_timeout: Duration::from_secs(env_parse("SESSION_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)),
            refresh_threshold: Duration::from_secs(env_parse(
                "SESSION_REFRESH_THRESHOLD_SECS",
                DEFAULT_REFRESH_THRESHOLD_SECS,
            )),
        })
    }

    /// Override the backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ConfigParse`] if the URL is not http(s).
    pub fn with_base_url(mut self, url: &str) -> Result<Self, AuthError> {
        self.api_base_url = parse_base_url(url)?;
        Ok(self)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_base_url(raw: &str) -> Result<String, AuthError> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AuthError::ConfigParse(format!("SESSION_API_BASE_URL must be http(s): {url}")));
    }
    Ok(url.to_owned())
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') { path.to_owned() } else { format!("/{path}") }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
