//! Command consumption and dispatch
//!
//! One consumer worker per bound manager long-polls the manager's command
//! topics and dispatches each returned message. Routing is decided once at
//! binding construction: topic name to [`CommandKind`], command kind to the
//! manager call. A failing handler is logged and the rest of the batch
//! still runs; a failing poll cycle is logged and the loop resumes after a
//! short pause.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tracing::{debug, error, info, warn};

use tether_client::{RelayClient, TransportError};
use tether_core::domain::message::Message;
use tether_core::domain::topic::ManagerTopics;

use crate::manager::JobManager;
use crate::state::RelayState;

/// Pause before resuming the loop after a failed poll cycle.
const CYCLE_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// The control commands a manager receives over the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Accept and start a new job.
    Setup,
    /// Re-publish the current state of a job.
    StatusRequest,
    /// Terminate a job.
    Kill,
}

/// Immutable routing table for one bound manager: the consumed topic set
/// and the command each topic carries.
pub struct ConsumerBinding {
    topics: Vec<String>,
    routes: HashMap<String, CommandKind>,
    manager: Arc<dyn JobManager>,
}

impl ConsumerBinding {
    pub fn new(topics: &ManagerTopics, manager: Arc<dyn JobManager>) -> Self {
        let routes = HashMap::from([
            (topics.setup.clone(), CommandKind::Setup),
            (topics.status_request.clone(), CommandKind::StatusRequest),
            (topics.kill.clone(), CommandKind::Kill),
        ]);
        Self {
            topics: topics.consumed(),
            routes,
            manager,
        }
    }

    /// The topic set this binding polls.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Route one message to its manager call. Handler failures are logged
    /// with whatever job identity the payload carries and never propagate.
    async fn dispatch(&self, message: &Message) {
        let Some(kind) = self.routes.get(&message.topic) else {
            warn!(topic = %message.topic, "message on topic with no registered handler");
            return;
        };

        debug!(
            topic = %message.topic,
            message_id = %message.message_id,
            command = ?kind,
            "dispatching command"
        );

        let result = match kind {
            CommandKind::Setup => self.manager.submit_job(message.payload.clone()).await,
            CommandKind::StatusRequest => match extract_job_id(&message.payload) {
                Some(job_id) => self.manager.trigger_state_change_callback(&job_id).await,
                None => Err(anyhow!("status request payload carries no job_id")),
            },
            CommandKind::Kill => match extract_job_id(&message.payload) {
                Some(job_id) => self.manager.kill(&job_id).await,
                None => Err(anyhow!("kill payload carries no job_id")),
            },
        };

        if let Err(err) = result {
            let job_id =
                extract_job_id(&message.payload).unwrap_or_else(|| "unknown".to_string());
            error!(
                topic = %message.topic,
                message_id = %message.message_id,
                job_id,
                error = %err,
                "command handler failed"
            );
        }
    }
}

/// Best-effort job identity from a command payload.
fn extract_job_id(payload: &serde_json::Value) -> Option<String> {
    match payload.get("job_id")? {
        serde_json::Value::String(id) => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Background worker that polls a binding's topics and dispatches commands
/// until its [`RelayState`] is deactivated.
pub struct ConsumerLoop {
    client: Arc<RelayClient>,
    binding: ConsumerBinding,
    state: Arc<RelayState>,
    poll_timeout: Duration,
}

impl ConsumerLoop {
    pub fn new(
        client: Arc<RelayClient>,
        binding: ConsumerBinding,
        state: Arc<RelayState>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            client,
            binding,
            state,
            poll_timeout,
        }
    }

    /// Poll and dispatch until deactivated.
    pub async fn run(self) {
        info!(topics = ?self.binding.topics(), "relay consumer started");

        while self.state.is_active() {
            if let Err(err) = self.poll_once().await {
                error!(error = %err, "consumer poll cycle failed");
                if !self.state.is_active() {
                    break;
                }
                tokio::time::sleep(CYCLE_ERROR_PAUSE).await;
            }
        }

        info!(topics = ?self.binding.topics(), "relay consumer stopped");
    }

    /// One poll cycle: a single long poll, then sequential dispatch of the
    /// returned batch. The active flag is re-checked between the poll and
    /// the dispatch so a shutdown requested mid-poll drops the batch.
    async fn poll_once(&self) -> Result<(), TransportError> {
        let messages = self
            .client
            .long_poll(self.binding.topics(), self.poll_timeout)
            .await?;

        if !self.state.is_active() {
            return Ok(());
        }

        if !messages.is_empty() {
            debug!(count = messages.len(), "dispatching polled batch");
        }
        for message in &messages {
            self.binding.dispatch(message).await;
        }

        Ok(())
    }
}
