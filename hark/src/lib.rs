//! # hark - Pattern-Based Real-Time Chat Client
//!
//! `hark` connects to a chat platform's real-time socket, keeps a directory
//! of users and channels, and dispatches every incoming event to listeners
//! registered with a declarative [`Filter`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hark::prelude::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load("hark.toml")?;
//! let bot = Bot::from_config(&config);
//!
//! let replies = bot.clone();
//! bot.hears(
//!     "deploy",
//!     Filter::new()
//!         .field("channel", "#ops")
//!         .field("text", Regex::new(r"^deploy (\w+)$")?),
//!     move |event: &Event, captures: &Captures| {
//!         let target = captures.get(0).unwrap_or_default();
//!         replies.say(format!("deploying {target}"), event.channel()).map(|_| ())
//!     },
//! );
//!
//! let session = bot.start(&HttpHandshake::from_config(&config)?).await?;
//! session.closed().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Filters
//!
//! Each `(field, expectation)` pair must hold for an event to match:
//!
//! - a string is an exact match; for `user` and `channel` it may be a name
//!   (`@neil`, `#general`) that is translated to an id first;
//! - a [`Regex`] is a partial match whose capture groups are
//!   passed to the handler;
//! - `true` requires the field to be present and non-empty.
//!
//! Fields may be dotted (`file.name`); `filename` is an alias for
//! `file.name`.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bot;
pub mod config;
pub mod error;
pub mod handshake;
pub mod outbox;
pub mod session;

pub use bot::{Bot, BotBuilder};
pub use config::{Config, ConfigError};
pub use error::{ConnectError, ConnectErrorKind, SendError};
pub use handshake::{Handshake, HandshakeResponse, HttpHandshake};
pub use outbox::{OutboundMessage, Outbox};
pub use session::Session;

pub use hark_core::{
    BoxError, CallbackError, Captures, DecodeError, Directory, Entity, Event, Expect, Filter,
    FilterError, Handler, IdConvention, IntoOutcome, MatchResult,
};
pub use hark_std::{DispatchReport, ListenerRegistry, NamePattern, Persistence, Subscription};

/// Patterns for filters and drops, so callers need no direct `regex` dependency.
pub use regex::{Regex, RegexBuilder};

/// Standard handler implementations.
pub mod handlers {
    pub use hark_std::handlers::LoggingHandler;
}

/// Testing utilities.
pub mod testing {
    pub use hark_std::testing::{
        CountingHandler, FailingHandler, RecordingHandler, directory, event,
    };
}

/// Prelude module - common imports for hark.
///
/// # Usage
///
/// ```rust
/// use hark::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Bot, Captures, Config, Directory, Entity, Event, Filter, Handler, Handshake,
        HttpHandshake, Regex, SendError, Session,
    };
}
