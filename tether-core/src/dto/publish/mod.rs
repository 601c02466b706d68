//! Publish DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::message::MessageId;

/// A message to publish on a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishMessage {
    pub topic: String,
    pub payload: serde_json::Value,
    /// Message time-to-live in seconds, if the relay should expire it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl PublishMessage {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            ttl: None,
            metadata: None,
        }
    }
}

/// Acknowledgement for a single published message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishAck {
    pub message_id: MessageId,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
}

/// Body for `POST /api/v1/messages/bulk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkPublishRequest {
    pub messages: Vec<PublishMessage>,
}

/// Per-message outcome within a bulk publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResult {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate counts for a bulk publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Response for `POST /api/v1/messages/bulk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkPublishResponse {
    pub results: Vec<BulkResult>,
    pub summary: BulkSummary,
}
