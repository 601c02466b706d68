//! Long-poll DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::message::{Message, MessageId};

/// Body for `POST /messages/poll`.
///
/// `since` carries the last-seen message id per topic and is restricted to
/// topics present in `topics`; topics without a cursor are simply absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRequest {
    pub topics: Vec<String>,
    /// Server-side hold window in seconds.
    pub timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<HashMap<String, MessageId>>,
}

/// Response for `POST /messages/poll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub has_more: bool,
}
