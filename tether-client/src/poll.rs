//! Long-polling with per-topic cursoring
//!
//! A poll request names its topic set, the server-side hold window, and a
//! `since` map of last-seen message ids restricted to that topic set. An
//! empty poll window is the steady state, not a failure: both an empty 2xx
//! response and a client-side request timeout yield an empty batch.

use std::time::Duration;

use tracing::debug;

use tether_core::domain::message::Message;
use tether_core::dto::poll::{PollRequest, PollResponse};

use crate::RelayClient;
use crate::error::{Result, TransportError};

/// Bounds the relay accepts for the hold window, in seconds.
const MIN_POLL_SECS: u64 = 1;
const MAX_POLL_SECS: u64 = 60;

impl RelayClient {
    // =============================================================================
    // Long-polling
    // =============================================================================

    /// Poll a topic set for new messages
    ///
    /// Holds the request open server-side for up to `timeout` (clamped into
    /// [1, 60] seconds) and returns whatever arrived. On success the
    /// per-topic cursors advance to the last id observed per topic, in the
    /// order the server returned the batch, so the next poll resumes after
    /// them.
    ///
    /// A window that elapses with no messages returns an empty vec,
    /// whether the server answered with an empty batch or the request
    /// timed out client-side. A 401 triggers one token invalidation and one retried
    /// request; any other failure is a [`TransportError`].
    pub async fn long_poll(&self, topics: &[String], timeout: Duration) -> Result<Vec<Message>> {
        let window_secs = timeout.as_secs().clamp(MIN_POLL_SECS, MAX_POLL_SECS);

        let since = self.cursors.snapshot(topics);
        let request = PollRequest {
            topics: topics.to_vec(),
            timeout: window_secs,
            since: (!since.is_empty()).then_some(since),
        };

        let mut auth_retried = false;
        loop {
            match self.send_poll(&request, window_secs).await {
                Ok(response) => {
                    if response.has_more {
                        debug!(topics = ?request.topics, "relay reports more messages pending");
                    }
                    self.cursors.advance(&response.messages);
                    return Ok(response.messages);
                }
                Err(error) if error.is_unauthorized() && !auth_retried => {
                    auth_retried = true;
                    self.auth.invalidate().await;
                }
                Err(TransportError::Request(e)) if e.is_timeout() => {
                    debug!(topics = ?request.topics, "poll window elapsed without messages");
                    return Ok(Vec::new());
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Single poll attempt. The request deadline is the hold window plus a
    /// grace allowance, so a healthy empty window is distinguishable from a
    /// dead connection.
    async fn send_poll(&self, request: &PollRequest, window_secs: u64) -> Result<PollResponse> {
        let token = self.auth.get_token().await?;
        let url = format!("{}/messages/poll", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .timeout(Duration::from_secs(window_secs) + self.poll_grace)
            .json(request)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
