#![allow(dead_code)]

use hark::{Bot, ConnectError, Directory, Entity, Handshake, HandshakeResponse};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Fixtures
// ============================================================================

pub fn users() -> Vec<Entity> {
    vec![Entity::new("n0", "neil"), Entity::new("U2", "ada")]
}

pub fn channels() -> Vec<Entity> {
    vec![Entity::new("CG0", "general"), Entity::new("C1", "random")]
}

pub fn directory() -> Directory {
    Directory::new(users(), channels())
}

/// A bot with the fixture directory and `#general` as default channel.
pub fn bot() -> Bot {
    Bot::builder()
        .default_channel("#general")
        .directory(directory())
        .build()
}

/// A raw `message` frame.
pub fn message(text: &str, channel: &str, user: &str) -> String {
    json!({"type": "message", "text": text, "channel": channel, "user": user}).to_string()
}

/// A successful handshake response pointing at `url`.
pub fn handshake_response(url: &str) -> HandshakeResponse {
    HandshakeResponse {
        ok: true,
        url: url.to_string(),
        users: users(),
        channels: channels(),
        me: Some(Entity::new("U9", "hark")),
        error: None,
    }
}

// ============================================================================
// Handshake Doubles
// ============================================================================

/// Answers every fetch with a fixed response.
pub struct FakeHandshake(pub HandshakeResponse);

impl Handshake for FakeHandshake {
    async fn fetch(&self) -> Result<HandshakeResponse, ConnectError> {
        Ok(self.0.clone())
    }
}

/// Answers with a fixed response after yielding once, and counts fetches.
pub struct CountingHandshake {
    response: HandshakeResponse,
    fetches: AtomicUsize,
}

impl CountingHandshake {
    pub fn new(response: HandshakeResponse) -> Self {
        Self {
            response,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Handshake for CountingHandshake {
    async fn fetch(&self) -> Result<HandshakeResponse, ConnectError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.response.clone())
    }
}
