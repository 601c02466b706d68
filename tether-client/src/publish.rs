//! Message publication endpoints
//!
//! `post_message` and `post_bulk_messages` share one retry wrapper:
//! transient failures (connection errors, request timeouts, 5xx) are
//! retried without bound under exponential backoff, genuine client errors
//! fail on the first attempt, and a single 401 buys one token invalidation
//! and one more pass through the wrapper before 4xx handling applies.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use tether_core::dto::publish::{
    BulkPublishRequest, BulkPublishResponse, PublishAck, PublishMessage,
};

use crate::RelayClient;
use crate::backoff::Backoff;
use crate::error::{AuthError, Result, TransportError};

/// What the retry wrapper should do with a failed attempt.
enum Disposition {
    /// Sleep out the next backoff delay and try again.
    Retry,
    /// Invalidate the cached token and try again immediately.
    RefreshAuth,
    /// Surface the error to the caller.
    Fail,
}

fn classify(error: &TransportError, auth_retried: bool) -> Disposition {
    match error {
        TransportError::Api { status: 401, .. } if !auth_retried => Disposition::RefreshAuth,
        TransportError::Api { status, .. } if *status >= 500 => Disposition::Retry,
        TransportError::Api { .. } => Disposition::Fail,
        TransportError::Request(e) => {
            if e.is_connect() || e.is_timeout() || e.is_request() {
                Disposition::Retry
            } else {
                Disposition::Fail
            }
        }
        // A login that failed on the network, or that the relay answered
        // with a 5xx, is as transient as the publish itself.
        TransportError::Auth(AuthError::Request(_)) => Disposition::Retry,
        TransportError::Auth(AuthError::Rejected { status, .. }) if *status >= 500 => {
            Disposition::Retry
        }
        TransportError::Auth(_) => Disposition::Fail,
        TransportError::Parse(_) => Disposition::Fail,
    }
}

impl RelayClient {
    // =============================================================================
    // Publication
    // =============================================================================

    /// Publish a single message on a topic
    ///
    /// Retries transient failures forever; during a sustained relay outage
    /// this call blocks until the relay recovers. See the crate docs for
    /// the full contract.
    ///
    /// # Arguments
    /// * `topic` - Destination topic
    /// * `payload` - Arbitrary structured payload
    /// * `ttl` - Optional time-to-live in seconds
    /// * `metadata` - Optional structured metadata
    ///
    /// # Returns
    /// The relay's acknowledgement with the assigned message id
    pub async fn post_message(
        &self,
        topic: impl Into<String>,
        payload: serde_json::Value,
        ttl: Option<u64>,
        metadata: Option<serde_json::Value>,
    ) -> Result<PublishAck> {
        let request = PublishMessage {
            topic: topic.into(),
            payload,
            ttl,
            metadata,
        };
        self.execute_publish("/api/v1/messages", &request).await
    }

    /// Publish a batch of messages in one request
    ///
    /// The whole batch is retried as a unit under the same policy as
    /// [`RelayClient::post_message`]; per-message outcomes are reported in
    /// the response's `results` and `summary`.
    pub async fn post_bulk_messages(
        &self,
        messages: Vec<PublishMessage>,
    ) -> Result<BulkPublishResponse> {
        let request = BulkPublishRequest { messages };
        self.execute_publish("/api/v1/messages/bulk", &request).await
    }

    /// Retry wrapper shared by the publish endpoints.
    async fn execute_publish<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let mut backoff = Backoff::new(self.retry.clone());
        let mut auth_retried = false;
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            let error = match self.send_authorized(path, body).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(path, attempt, "publish succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            match classify(&error, auth_retried) {
                Disposition::RefreshAuth => {
                    warn!(path, "relay rejected bearer token, re-authenticating");
                    self.auth.invalidate().await;
                    auth_retried = true;
                }
                Disposition::Retry => {
                    let delay = backoff.next_delay();
                    warn!(
                        path,
                        attempt,
                        error = %error,
                        delay_secs = delay.as_secs_f64(),
                        "publish attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Disposition::Fail => return Err(error),
            }
        }
    }

    /// Single authorized POST attempt.
    async fn send_authorized<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let token = self.auth.get_token().await?;
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
