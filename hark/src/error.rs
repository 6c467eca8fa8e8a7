//! Error types for the client.
//!
//! - [`ConnectError`] - Startup failed; returned once from [`Bot::start`](crate::Bot::start)
//! - [`SendError`] - An outbound message could not be queued
//! - [`ConfigError`](crate::config::ConfigError) lives next to the config loader

use hark_core::BoxError;
use std::fmt;
use thiserror::Error;

/// What stage of startup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectErrorKind {
    /// The handshake request never got a response.
    Transport,
    /// The handshake responded with a non-success status.
    Status,
    /// The handshake responded with `ok: false`.
    Rejected,
    /// The handshake body could not be decoded.
    Decode,
    /// The socket could not be opened.
    Socket,
    /// `start` was called on a bot that already has a session.
    AlreadyStarted,
}

impl fmt::Display for ConnectErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectErrorKind::Transport => "handshake request failed",
            ConnectErrorKind::Status => "handshake returned an error status",
            ConnectErrorKind::Rejected => "handshake was rejected",
            ConnectErrorKind::Decode => "handshake response could not be decoded",
            ConnectErrorKind::Socket => "socket could not be opened",
            ConnectErrorKind::AlreadyStarted => "bot is already started",
        };
        f.write_str(text)
    }
}

/// A fatal startup failure. There is no retry.
#[derive(Error, Debug)]
#[error("{kind}{}", detail(.status, .reason, .body))]
pub struct ConnectError {
    /// The failing stage.
    pub kind: ConnectErrorKind,
    /// HTTP status of the handshake response, when there was one.
    pub status: Option<u16>,
    /// Raw handshake response body, when there was one.
    pub body: Option<String>,
    /// Platform error string of a rejected handshake.
    pub reason: Option<String>,
    /// The underlying error.
    #[source]
    pub source: Option<BoxError>,
}

fn detail(status: &Option<u16>, reason: &Option<String>, body: &Option<String>) -> String {
    match (status, reason.as_ref().or(body.as_ref())) {
        (Some(status), Some(text)) => format!(" (status {status}: {text})"),
        (Some(status), None) => format!(" (status {status})"),
        (None, Some(text)) => format!(" ({text})"),
        (None, None) => String::new(),
    }
}

impl ConnectError {
    fn new(kind: ConnectErrorKind) -> Self {
        Self {
            kind,
            status: None,
            body: None,
            reason: None,
            source: None,
        }
    }

    /// Attach the status and raw body of the handshake response.
    pub fn with_response(mut self, status: u16, body: impl Into<String>) -> Self {
        self.status = Some(status);
        self.body = Some(body.into());
        self
    }

    /// The handshake request could not be made.
    pub fn transport(source: impl Into<BoxError>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(ConnectErrorKind::Transport)
        }
    }

    /// The handshake answered with a non-success status.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
            ..Self::new(ConnectErrorKind::Status)
        }
    }

    /// The platform answered `ok: false`.
    pub fn rejected(reason: Option<String>) -> Self {
        Self {
            reason,
            ..Self::new(ConnectErrorKind::Rejected)
        }
    }

    /// The handshake body was not what we expected.
    pub fn decode(source: impl Into<BoxError>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(ConnectErrorKind::Decode)
        }
    }

    /// The socket endpoint refused or failed the upgrade.
    pub fn socket(source: impl Into<BoxError>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(ConnectErrorKind::Socket)
        }
    }

    /// A session is already running.
    pub fn already_started() -> Self {
        Self::new(ConnectErrorKind::AlreadyStarted)
    }
}

/// Errors returned by [`Bot::say`](crate::Bot::say).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// No channel was given and no default channel is configured.
    #[error("no channel given and no default channel configured")]
    NoDestination,

    /// The channel name is not in the directory.
    #[error("unknown channel `{0}`")]
    UnknownChannel(String),

    /// The outbound queue has no consumer any more.
    #[error("outbound queue is closed")]
    Closed,
}
