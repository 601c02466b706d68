//! Tether Relay Client
//!
//! An HTTP client for the Tether message relay. The relay substitutes for a
//! persistent message broker: publishing is a plain authenticated POST and
//! consuming is authenticated long-polling, so clients behind restrictive
//! networks never hold a standing connection.
//!
//! Publish operations retry transient failures (connection errors, request
//! timeouts, 5xx responses) forever with exponential backoff. During a
//! sustained relay outage a publish call blocks until the relay recovers;
//! callers that cannot block must impose their own deadline. Genuine
//! client errors (4xx other than an expired-token 401) fail immediately.
//!
//! # Example
//!
//! ```no_run
//! use tether_client::{Credentials, RelayClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RelayClient::new(
//!         "http://localhost:8080",
//!         Credentials::new("svc-agent", "secret"),
//!     );
//!
//!     let ack = client
//!         .post_message("job_status_update", json!({"job_id": "j-1"}), None, None)
//!         .await?;
//!
//!     println!("published {} on {}", ack.message_id, ack.topic);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod backoff;
pub mod cursor;
pub mod error;
mod poll;
mod publish;

// Re-export commonly used types
pub use auth::{AuthManager, Credentials, DEFAULT_REFRESH_BUFFER};
pub use backoff::RetryPolicy;
pub use error::{AuthError, Result, TransportError};
pub use tether_core::domain::message::{Message, MessageId};
pub use tether_core::dto::publish::{BulkPublishResponse, PublishAck, PublishMessage};

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::cursor::CursorTable;

/// Extra client-side allowance on top of the server's long-poll hold
/// window before a poll request is abandoned as timed out.
pub const DEFAULT_POLL_GRACE: Duration = Duration::from_secs(10);

/// HTTP client for the Tether message relay
///
/// The client owns the bearer-token lifecycle ([`AuthManager`]) and the
/// per-topic poll cursors ([`CursorTable`]); methods are organized into
/// logical groups:
/// - Message publication (single and bulk, retrying)
/// - Long-polling with per-topic cursoring
/// - Cursor inspection and repair
pub struct RelayClient {
    /// Base URL of the relay (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    http: Client,
    auth: AuthManager,
    cursors: CursorTable,
    retry: RetryPolicy,
    poll_grace: Duration,
}

impl RelayClient {
    /// Create a new relay client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the relay (e.g., "http://localhost:8080")
    /// * `credentials` - Login credentials for the password grant
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self::with_client(base_url, credentials, Client::new())
    }

    /// Create a new relay client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use tether_client::{Credentials, RelayClient};
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http = Client::builder()
    ///     .connect_timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = RelayClient::with_client(
    ///     "http://localhost:8080",
    ///     Credentials::new("svc-agent", "secret"),
    ///     http,
    /// );
    /// ```
    pub fn with_client(
        base_url: impl Into<String>,
        credentials: Credentials,
        http: Client,
    ) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        let auth = AuthManager::new(http.clone(), &base_url, credentials);
        Self {
            base_url,
            http,
            auth,
            cursors: CursorTable::new(),
            retry: RetryPolicy::default(),
            poll_grace: DEFAULT_POLL_GRACE,
        }
    }

    /// Override the publish retry backoff parameters.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the client-side grace added to the long-poll window.
    pub fn with_poll_grace(mut self, poll_grace: Duration) -> Self {
        self.poll_grace = poll_grace;
        self
    }

    /// Override the token refresh buffer.
    pub fn with_refresh_buffer(mut self, refresh_buffer: Duration) -> Self {
        self.auth = self.auth.with_refresh_buffer(refresh_buffer);
        self
    }

    /// Get the base URL of the relay
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token cache, for forced invalidation.
    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    // =============================================================================
    // Cursor access
    // =============================================================================

    /// Last message id observed on a topic, if any.
    pub fn get_last_message_id(&self, topic: &str) -> Option<MessageId> {
        self.cursors.get(topic)
    }

    /// Overwrite the cursor for a topic. The next poll of that topic sends
    /// the new id as its `since` entry.
    pub fn set_last_message_id(&self, topic: impl Into<String>, id: MessageId) {
        self.cursors.set(topic, id);
    }

    /// Forget the cursor for one topic, or for all topics when `topic` is
    /// `None`, forcing redelivery from the relay's retention horizon.
    pub fn clear_tracked_message_ids(&self, topic: Option<&str>) {
        self.cursors.clear(topic);
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle a relay response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the response body if successful.
    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Parse(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("svc", "secret")
    }

    #[test]
    fn test_client_creation() {
        let client = RelayClient::new("http://localhost:8080", credentials());
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = RelayClient::new("http://localhost:8080/", credentials());
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http = Client::new();
        let client = RelayClient::with_client("http://localhost:8080", credentials(), http);
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
