//! The client facade.
//!
//! A [`Bot`] ties together the listener registry, the directory snapshot,
//! and the outbound queue. It is a cheap handle: clones share the same
//! state, so a handler may capture a clone and call [`Bot::say`] or
//! [`Bot::drop`] from inside a dispatch pass.
//!
//! ```rust
//! use hark::prelude::*;
//!
//! let bot = Bot::builder().default_channel("#general").build();
//! bot.seed(Directory::new(vec![], vec![Entity::new("CG0", "general")]));
//!
//! let replies = bot.clone();
//! bot.hears("ping", Filter::new().field("text", "ping"), move |_: &Event, _: &Captures| {
//!     replies.say("pong", None).map(|_| ())
//! });
//!
//! bot.pump(r#"{"type":"message","text":"ping","channel":"CG0"}"#);
//! assert_eq!(bot.next_message_id(), 2);
//! ```
//!
//! A handler that captures a clone of its own bot keeps the bot alive until
//! the subscription is dropped.

use crate::{
    config::Config,
    error::{ConnectError, SendError},
    handshake::Handshake,
    outbox::{FIRST_MESSAGE_ID, OutboundMessage, Outbox},
    session::Session,
};
use hark_core::{Directory, Entity, Event, Filter, Handler, IdConvention};
use hark_std::{DispatchReport, ListenerRegistry, NamePattern};
use parking_lot::{Mutex, RwLock};
use std::{fmt, sync::Arc};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

/// Handle to a chat client.
#[derive(Clone)]
pub struct Bot {
    inner: Arc<Inner>,
}

struct Inner {
    registry: ListenerRegistry,
    directory: RwLock<Arc<Directory>>,
    outbox: Outbox,
    outbound: Mutex<Option<UnboundedReceiver<OutboundMessage>>>,
    default_channel: Option<String>,
    ids: IdConvention,
}

impl Bot {
    /// A bot with no default channel and the default id convention.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a bot.
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// A bot configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::builder().ids(config.ids.clone());
        if let Some(channel) = &config.default_channel {
            builder = builder.default_channel(channel.clone());
        }
        builder.build()
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Run `handler` for every event matching `filter`.
    pub fn hears<H: Handler>(&self, name: impl Into<String>, filter: Filter, handler: H) {
        self.inner.registry.register(name, filter, handler);
    }

    /// Run `handler` for the first event matching `filter`, then forget it.
    pub fn hears_once<H: Handler>(&self, name: impl Into<String>, filter: Filter, handler: H) {
        self.inner.registry.register_once(name, filter, handler);
    }

    /// Run `handler` for every event, unfiltered.
    pub fn on_event<H: Handler>(&self, name: impl Into<String>, handler: H) {
        self.inner.registry.register(name, Filter::new(), handler);
    }

    /// Remove every listener whose name is selected by `pattern`: an exact
    /// name, `"*"` for all, or a [`Regex`](crate::Regex) matched against the
    /// whole name. Returns how many were removed.
    pub fn drop(&self, pattern: impl Into<NamePattern>) -> usize {
        self.inner.registry.drop_by_name(pattern)
    }

    /// The listener registry.
    pub fn registry(&self) -> &ListenerRegistry {
        &self.inner.registry
    }

    // ------------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------------

    /// Queue `text` for `channel` (a name with or without `#`, or an id),
    /// falling back to the default channel. Returns the message id.
    ///
    /// Failures are logged and returned, never raised into the dispatch pass.
    pub fn say(&self, text: impl Into<String>, channel: Option<&str>) -> Result<u64, SendError> {
        let Some(target) = channel.or(self.inner.default_channel.as_deref()) else {
            warn!("no channel given and no default channel; message not sent");
            return Err(SendError::NoDestination);
        };

        let directory = self.directory();
        let Some(channel_id) = directory.resolve_channel(target) else {
            warn!(channel = target, "unknown channel; message not sent");
            return Err(SendError::UnknownChannel(target.to_string()));
        };

        self.inner.outbox.send(channel_id, text).inspect_err(|error| {
            warn!(channel = channel_id, %error, "message not sent");
        })
    }

    /// The id the next outbound message will get.
    pub fn next_message_id(&self) -> u64 {
        self.inner.outbox.peek_id()
    }

    /// Take the receiving end of the outbound queue, for callers driving
    /// their own transport. Returns `None` once taken or once a session
    /// has started.
    pub fn take_outbound(&self) -> Option<UnboundedReceiver<OutboundMessage>> {
        self.inner.outbound.lock().take()
    }

    // ------------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------------

    /// Decode one raw frame and dispatch it. Undecodable frames are logged
    /// and dropped.
    pub fn pump(&self, frame: &str) -> Option<DispatchReport> {
        match Event::decode(frame) {
            Ok(event) => Some(self.dispatch(&event)),
            Err(error) => {
                warn!(%error, "dropping undecodable frame");
                None
            }
        }
    }

    /// Dispatch one event to every listener.
    pub fn dispatch(&self, event: &Event) -> DispatchReport {
        let directory = self.directory();
        self.inner.registry.dispatch(event, &directory)
    }

    // ------------------------------------------------------------------------
    // Directory
    // ------------------------------------------------------------------------

    /// Replace the directory snapshot.
    pub fn seed(&self, directory: Directory) {
        info!(
            users = directory.users().len(),
            channels = directory.channels().len(),
            "directory loaded"
        );
        *self.inner.directory.write() = Arc::new(directory);
    }

    /// The current directory snapshot.
    pub fn directory(&self) -> Arc<Directory> {
        Arc::clone(&self.inner.directory.read())
    }

    /// The connected account, once the handshake has reported it.
    pub fn me(&self) -> Option<Entity> {
        self.directory().me().cloned()
    }

    // ------------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------------

    /// Perform the handshake, seed the directory, open the socket, and
    /// start the session. A bot can be started once.
    ///
    /// The outbound queue is claimed before the handshake, so a concurrent
    /// `start` fails fast with `AlreadyStarted`. If startup fails or is
    /// cancelled, the claim is released and the bot can be started again.
    pub async fn start<H: Handshake>(&self, handshake: &H) -> Result<Session, ConnectError> {
        let claim = OutboundClaim::take(&self.inner.outbound)
            .ok_or_else(ConnectError::already_started)?;

        let response = handshake.fetch().await?.validated()?;
        let (url, directory) = response.into_parts(self.inner.ids.clone());
        self.seed(directory);

        let (socket, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(ConnectError::socket)?;

        let outbound = claim.keep().ok_or_else(ConnectError::already_started)?;
        info!(me = ?self.me().map(|me| me.name), "connected");
        Ok(Session::spawn(socket, self.clone(), outbound))
    }
}

/// The outbound receiver, taken out of its slot for the duration of a
/// `start`. Dropping the claim puts the receiver back.
struct OutboundClaim<'a> {
    slot: &'a Mutex<Option<UnboundedReceiver<OutboundMessage>>>,
    receiver: Option<UnboundedReceiver<OutboundMessage>>,
}

impl<'a> OutboundClaim<'a> {
    fn take(slot: &'a Mutex<Option<UnboundedReceiver<OutboundMessage>>>) -> Option<Self> {
        let receiver = slot.lock().take()?;
        Some(Self {
            slot,
            receiver: Some(receiver),
        })
    }

    fn keep(mut self) -> Option<UnboundedReceiver<OutboundMessage>> {
        self.receiver.take()
    }
}

impl Drop for OutboundClaim<'_> {
    fn drop(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            *self.slot.lock() = Some(receiver);
        }
    }
}

impl Default for Bot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("listeners", &self.inner.registry.len())
            .field("default_channel", &self.inner.default_channel)
            .field("next_message_id", &self.next_message_id())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for a [`Bot`].
#[derive(Debug, Clone)]
pub struct BotBuilder {
    default_channel: Option<String>,
    ids: IdConvention,
    first_message_id: u64,
    directory: Option<Directory>,
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self {
            default_channel: None,
            ids: IdConvention::default(),
            first_message_id: FIRST_MESSAGE_ID,
            directory: None,
        }
    }
}

impl BotBuilder {
    /// Channel used by `say` when none is given.
    pub fn default_channel(mut self, channel: impl Into<String>) -> Self {
        self.default_channel = Some(channel.into());
        self
    }

    /// Id convention applied to the directory loaded at startup.
    pub fn ids(mut self, ids: IdConvention) -> Self {
        self.ids = ids;
        self
    }

    /// Id of the first outbound message.
    pub fn first_message_id(mut self, id: u64) -> Self {
        self.first_message_id = id;
        self
    }

    /// Initial directory, before any handshake.
    pub fn directory(mut self, directory: Directory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Build the bot.
    pub fn build(self) -> Bot {
        let (outbox, outbound) = Outbox::starting_at(self.first_message_id);
        let directory = self
            .directory
            .unwrap_or_else(|| Directory::default().with_convention(self.ids.clone()));
        Bot {
            inner: Arc::new(Inner {
                registry: ListenerRegistry::new(),
                directory: RwLock::new(Arc::new(directory)),
                outbox,
                outbound: Mutex::new(Some(outbound)),
                default_channel: self.default_channel,
                ids: self.ids,
            }),
        }
    }
}
