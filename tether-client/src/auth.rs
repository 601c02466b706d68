//! Bearer token lifecycle
//!
//! The relay authenticates with a password-grant login that returns a
//! short-lived bearer token. [`AuthManager`] caches the token and refreshes
//! it before expiry; the check and the refresh share one critical section
//! so concurrent callers serialize instead of double-authenticating.

use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

use tether_core::dto::auth::{LoginRequest, LoginResponse};

use crate::error::AuthError;

/// Tokens within this margin of expiry are treated as already stale.
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::from_secs(300);

/// Relay login credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A cached bearer token.
#[derive(Debug, Clone)]
struct Token {
    value: String,
    expires_at: Instant,
}

impl Token {
    /// A token is usable only while more than `refresh_buffer` remains
    /// before expiry.
    fn is_usable(&self, refresh_buffer: Duration) -> bool {
        match self.expires_at.checked_duration_since(Instant::now()) {
            Some(remaining) => remaining > refresh_buffer,
            None => false,
        }
    }
}

/// Caches a bearer token and refreshes it on demand.
pub struct AuthManager {
    http: Client,
    login_url: String,
    credentials: Credentials,
    refresh_buffer: Duration,
    cached: Mutex<Option<Token>>,
}

impl AuthManager {
    pub fn new(http: Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            http,
            login_url: format!("{}/auth/login", base_url),
            credentials,
            refresh_buffer: DEFAULT_REFRESH_BUFFER,
            cached: Mutex::new(None),
        }
    }

    /// Override the refresh buffer (mainly for tests and short-lived grants).
    pub fn with_refresh_buffer(mut self, refresh_buffer: Duration) -> Self {
        self.refresh_buffer = refresh_buffer;
        self
    }

    /// Returns a usable bearer token, authenticating if the cached one is
    /// missing, expired, or inside the refresh buffer.
    ///
    /// The lock is held across the refresh so concurrent callers wait for
    /// one login rather than racing their own.
    pub async fn get_token(&self) -> std::result::Result<String, AuthError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_usable(self.refresh_buffer) {
                return Ok(token.value.clone());
            }
        }

        debug!(url = %self.login_url, "authenticating with relay");
        let token = self.authenticate().await?;
        let value = token.value.clone();
        *cached = Some(token);

        Ok(value)
    }

    /// Drops the cached token unconditionally. The next `get_token` call
    /// re-authenticates.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.lock().await;
        if cached.take().is_some() {
            debug!("bearer token invalidated");
        }
    }

    async fn authenticate(&self) -> std::result::Result<Token, AuthError> {
        let form = LoginRequest::password_grant(
            self.credentials.username.clone(),
            self.credentials.password.clone(),
        );

        let response = self.http.post(&self.login_url).form(&form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let grant: LoginResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Parse(format!("Failed to parse login grant: {}", e)))?;

        Ok(Token {
            value: grant.access_token,
            expires_at: Instant::now() + Duration::from_secs(grant.expires_in),
        })
    }
}
