//! Outbound message queue.
//!
//! Every message gets an id from a counter owned by the [`Outbox`]. Ids are
//! strictly increasing, start at [`FIRST_MESSAGE_ID`], and are never reused,
//! even when queueing fails.

use crate::error::SendError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::trace;

/// Id of the first message sent on a connection.
pub const FIRST_MESSAGE_ID: u64 = 1;

/// Value of the `type` field of every outbound message.
pub const MESSAGE_TYPE: &str = "message";

/// One outbound frame, serialised as
/// `{"id": .., "type": "message", "channel": .., "text": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Per-connection message id.
    pub id: u64,
    /// Always [`MESSAGE_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Destination channel id.
    pub channel: String,
    /// Message body.
    pub text: String,
}

impl OutboundMessage {
    /// Encode as a JSON text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Sending half of the outbound queue.
#[derive(Debug)]
pub struct Outbox {
    next_id: AtomicU64,
    sender: UnboundedSender<OutboundMessage>,
}

impl Outbox {
    /// Create an outbox whose first message gets [`FIRST_MESSAGE_ID`].
    pub fn new() -> (Self, UnboundedReceiver<OutboundMessage>) {
        Self::starting_at(FIRST_MESSAGE_ID)
    }

    /// Create an outbox whose first message gets `first_id`.
    pub fn starting_at(first_id: u64) -> (Self, UnboundedReceiver<OutboundMessage>) {
        let (sender, receiver) = unbounded_channel();
        let outbox = Self {
            next_id: AtomicU64::new(first_id),
            sender,
        };
        (outbox, receiver)
    }

    /// The id the next message will get.
    pub fn peek_id(&self) -> u64 {
        self.next_id.load(Ordering::Acquire)
    }

    /// Queue `text` for `channel_id`. Returns the id assigned to it.
    pub fn send(
        &self,
        channel_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<u64, SendError> {
        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        let message = OutboundMessage {
            id,
            kind: MESSAGE_TYPE.to_string(),
            channel: channel_id.into(),
            text: text.into(),
        };
        trace!(id, channel = %message.channel, "queueing message");
        self.sender.send(message).map_err(|_| SendError::Closed)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let (outbox, mut rx) = Outbox::new();
        assert_eq!(outbox.send("C1", "a"), Ok(1));
        assert_eq!(outbox.send("C1", "b"), Ok(2));
        assert_eq!(rx.try_recv().unwrap().id, 1);
        assert_eq!(rx.try_recv().unwrap().id, 2);
        assert_eq!(outbox.peek_id(), 3);
    }

    #[test]
    fn test_injected_start() {
        let (outbox, _rx) = Outbox::starting_at(41);
        assert_eq!(outbox.send("C1", "a"), Ok(41));
        assert_eq!(outbox.send("C1", "b"), Ok(42));
    }

    #[test]
    fn test_closed_queue_still_consumes_id() {
        let (outbox, rx) = Outbox::new();
        drop(rx);
        assert_eq!(outbox.send("C1", "lost"), Err(SendError::Closed));
        assert_eq!(outbox.peek_id(), 2);
    }

    #[test]
    fn test_frame_shape() {
        let (outbox, mut rx) = Outbox::new();
        outbox.send("CG0", "hello").unwrap();
        let frame = rx.try_recv().unwrap().to_frame().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            value,
            json!({"id": 1, "type": "message", "channel": "CG0", "text": "hello"})
        );
    }
}
