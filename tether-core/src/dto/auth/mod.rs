//! Login DTOs

use serde::{Deserialize, Serialize};

/// Form body for `POST /auth/login` (password grant).
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub grant_type: String,
}

impl LoginRequest {
    pub fn password_grant(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            grant_type: "password".to_string(),
        }
    }
}

/// Successful login grant.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Token lifetime in seconds from the moment of issue.
    pub expires_in: u64,
}
