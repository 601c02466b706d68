//! Per-topic message cursors
//!
//! The relay redelivers from the last id a consumer reports, so the client
//! tracks the last message id observed per topic and sends it back as the
//! `since` map on the next poll. Cursors advance only from ids actually
//! observed in a successful response and are never rewound automatically;
//! the manual accessors exist for operator intervention and assume a single
//! writer at a time.

use std::collections::HashMap;
use std::sync::Mutex;

use tether_core::domain::message::{Message, MessageId};

/// Mapping of topic to last-seen message id.
#[derive(Debug, Default)]
pub struct CursorTable {
    entries: Mutex<HashMap<String, MessageId>>,
}

impl CursorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `since` map for a poll request: cursors for the requested topics
    /// only. Topics never polled, or with no cursor yet, are omitted.
    pub(crate) fn snapshot(&self, topics: &[String]) -> HashMap<String, MessageId> {
        let entries = self.entries.lock().unwrap();
        topics
            .iter()
            .filter_map(|topic| {
                entries
                    .get(topic)
                    .map(|id| (topic.clone(), id.clone()))
            })
            .collect()
    }

    /// Advance cursors from a successful poll response, in server order.
    /// The last message observed for a topic wins.
    pub(crate) fn advance(&self, messages: &[Message]) {
        if messages.is_empty() {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        for message in messages {
            entries.insert(message.topic.clone(), message.message_id.clone());
        }
    }

    pub fn get(&self, topic: &str) -> Option<MessageId> {
        self.entries.lock().unwrap().get(topic).cloned()
    }

    pub fn set(&self, topic: impl Into<String>, id: MessageId) {
        self.entries.lock().unwrap().insert(topic.into(), id);
    }

    /// Remove the cursor for one topic, or every cursor when `topic` is
    /// `None`.
    pub fn clear(&self, topic: Option<&str>) {
        let mut entries = self.entries.lock().unwrap();
        match topic {
            Some(topic) => {
                entries.remove(topic);
            }
            None => entries.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(topic: &str, id: &str) -> Message {
        Message {
            topic: topic.to_string(),
            message_id: MessageId::from(id),
            payload: json!({}),
            ttl: None,
            metadata: None,
        }
    }

    #[test]
    fn test_untouched_topic_has_no_cursor() {
        let cursors = CursorTable::new();
        assert!(cursors.get("job_setup").is_none());
    }

    #[test]
    fn test_set_then_get_returns_the_id() {
        let cursors = CursorTable::new();
        cursors.set("job_setup", MessageId::from("m-9"));
        assert_eq!(cursors.get("job_setup"), Some(MessageId::from("m-9")));
    }

    #[test]
    fn test_clear_single_topic_leaves_others() {
        let cursors = CursorTable::new();
        cursors.set("a", MessageId::from("1"));
        cursors.set("b", MessageId::from("2"));

        cursors.clear(Some("a"));
        assert!(cursors.get("a").is_none());
        assert_eq!(cursors.get("b"), Some(MessageId::from("2")));
    }

    #[test]
    fn test_clear_all_removes_everything() {
        let cursors = CursorTable::new();
        cursors.set("a", MessageId::from("1"));
        cursors.set("b", MessageId::from("2"));

        cursors.clear(None);
        assert!(cursors.get("a").is_none());
        assert!(cursors.get("b").is_none());
    }

    #[test]
    fn test_snapshot_is_restricted_to_requested_topics() {
        let cursors = CursorTable::new();
        cursors.set("a", MessageId::from("x"));
        cursors.set("b", MessageId::from("y"));
        cursors.set("c", MessageId::from("z"));

        let since = cursors.snapshot(&["a".to_string(), "b".to_string(), "d".to_string()]);
        assert_eq!(since.len(), 2);
        assert_eq!(since.get("a"), Some(&MessageId::from("x")));
        assert_eq!(since.get("b"), Some(&MessageId::from("y")));
        assert!(!since.contains_key("c"));
        assert!(!since.contains_key("d"));
    }

    #[test]
    fn test_advance_takes_last_observed_id_per_topic() {
        let cursors = CursorTable::new();
        cursors.advance(&[
            message("a", "1"),
            message("b", "7"),
            message("a", "2"),
        ]);

        assert_eq!(cursors.get("a"), Some(MessageId::from("2")));
        assert_eq!(cursors.get("b"), Some(MessageId::from("7")));
    }
}
