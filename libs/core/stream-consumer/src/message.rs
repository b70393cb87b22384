//! Stream entry value type
//!
//! Wraps one stream entry: the store-assigned ID plus its field/value body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry read from a stream.
///
/// Immutable once constructed. The body keeps the field order the store
/// returned it in. Shared by value between the client and failure handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Stream entry ID (e.g., "1234567890123-0")
    id: String,

    /// Field/value pairs in store order
    body: Vec<(String, String)>,
}

impl Message {
    /// Create a new Message from an entry ID and its fields.
    pub fn new(id: impl Into<String>, body: Vec<(String, String)>) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    /// Get the entry ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the field/value pairs in store order.
    pub fn body(&self) -> &[(String, String)] {
        &self.body
    }

    /// Look up a single field value by name.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.body
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// When the entry was appended, parsed from the entry ID.
    ///
    /// Entry IDs are in format "timestamp_ms-sequence". Returns `None` for
    /// IDs that do not carry a parseable millisecond timestamp.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.id
            .split('-')
            .next()
            .and_then(|ts| ts.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let msg = Message::new(
            "1234567890123-0",
            vec![
                ("key".to_string(), "value".to_string()),
                ("other".to_string(), "data".to_string()),
            ],
        );

        assert_eq!(msg.id(), "1234567890123-0");
        assert_eq!(msg.get("key"), Some("value"));
        assert_eq!(msg.get("other"), Some("data"));
        assert_eq!(msg.get("missing"), None);
    }

    #[test]
    fn test_body_preserves_order() {
        let msg = Message::new(
            "1-0",
            vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string()),
                ("c".to_string(), "3".to_string()),
            ],
        );

        let names: Vec<&str> = msg.body().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_timestamp_from_id() {
        let now_ms = Utc::now().timestamp_millis();
        let msg = Message::new(format!("{}-0", now_ms), vec![]);

        let ts = msg.timestamp().unwrap();
        assert_eq!(ts.timestamp_millis(), now_ms);
    }

    #[test]
    fn test_timestamp_malformed_id() {
        let msg = Message::new("not-a-stream-id", vec![]);
        assert!(msg.timestamp().is_none());
    }
}
