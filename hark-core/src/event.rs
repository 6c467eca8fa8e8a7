//! # Inbound Events
//!
//! Provides [`Event`], the decoded form of one inbound frame.
//!
//! Events wrap their fields in an `Arc`, so cloning is O(1). The registry
//! hands the same event to every matching subscription, and handlers that
//! want to keep an event around (or move it into a spawned task) can clone
//! it freely.
//!
//! # Example
//!
//! ```rust
//! use hark_core::Event;
//!
//! let event = Event::decode(r#"{"type":"message","text":"hi"}"#).unwrap();
//! assert_eq!(event.text(), Some("hi"));
//! assert!(event.get("file.name").is_none());
//! ```

use crate::error::{DecodeError, json_kind};
use serde_json::{Map, Value};
use std::sync::Arc;

/// One decoded inbound event.
///
/// Events are read-only. Field access goes through [`Event::get`], which
/// applies the same resolution rules as filters (see [`crate::field`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Event(Arc<Map<String, Value>>);

impl Event {
    /// Create an event from its top-level fields.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(Arc::new(fields))
    }

    /// Decode one raw inbound frame.
    ///
    /// Fails when the frame is not JSON or when it is JSON but not an object.
    pub fn decode(frame: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(frame)?;
        Self::try_from(value)
    }

    /// The top-level fields of this event.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Resolve a plain, dotted, or aliased field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        crate::field::resolve(self, field)
    }

    /// Resolve a field and return it if it holds a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// The `type` field.
    pub fn event_type(&self) -> Option<&str> {
        self.get_str("type")
    }

    /// The `text` field.
    pub fn text(&self) -> Option<&str> {
        self.get_str("text")
    }

    /// The `channel` field (a channel id on the wire).
    pub fn channel(&self) -> Option<&str> {
        self.get_str("channel")
    }

    /// The `user` field (a user id on the wire).
    pub fn user(&self) -> Option<&str> {
        self.get_str("user")
    }

    /// Returns the number of live handles to this event's fields.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl From<Map<String, Value>> for Event {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl TryFrom<Value> for Event {
    type Error = DecodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(DecodeError::NotAnObject(json_kind(&other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_object() {
        let event = Event::decode(r#"{"type":"message","channel":"C1","user":"U1"}"#).unwrap();
        assert_eq!(event.event_type(), Some("message"));
        assert_eq!(event.channel(), Some("C1"));
        assert_eq!(event.user(), Some("U1"));
        assert_eq!(event.text(), None);
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = Event::decode("{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = Event::decode("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject("array")));
    }

    #[test]
    fn test_clone_is_shared() {
        let event = Event::try_from(json!({"text": "hello"})).unwrap();
        let cloned = event.clone();
        assert_eq!(event.strong_count(), 2);
        assert_eq!(cloned.text(), Some("hello"));
    }
}
