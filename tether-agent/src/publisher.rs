//! Job status publication

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error};

use tether_client::RelayClient;
use tether_core::domain::job::{JobState, StatusUpdate};

use crate::manager::StateChangeHandler;

/// Publishes job state transitions on the manager's status update topic.
///
/// Installed as the manager's state-change callback by
/// [`bind_manager`](crate::binding::bind_manager). Publish failures are
/// logged here and re-raised; what to do about them is the manager's
/// responsibility.
pub struct StatusPublisher {
    client: Arc<RelayClient>,
    topic: String,
    manager_name: String,
}

impl StatusPublisher {
    pub fn new(client: Arc<RelayClient>, topic: String, manager_name: String) -> Self {
        Self {
            client,
            topic,
            manager_name,
        }
    }

    /// The topic updates are published on.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl StateChangeHandler for StatusPublisher {
    async fn on_state_change(&self, state: JobState, job_id: &str) -> anyhow::Result<()> {
        let update = StatusUpdate {
            job_id: job_id.to_string(),
            state,
            manager: self.manager_name.clone(),
            timestamp: Utc::now(),
        };
        let payload = serde_json::to_value(&update)?;

        let publish = self
            .client
            .post_message(self.topic.as_str(), payload, None, None)
            .await;
        match publish {
            Ok(ack) => {
                debug!(
                    job_id,
                    state = %state,
                    topic = %self.topic,
                    message_id = %ack.message_id,
                    "published status update"
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    job_id,
                    state = %state,
                    topic = %self.topic,
                    error = %err,
                    "failed to publish status update"
                );
                Err(err.into())
            }
        }
    }
}
