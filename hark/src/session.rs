//! A running socket connection.
//!
//! A [`Session`] owns two tasks:
//!
//! - the **reader**, which pumps every text frame through
//!   [`Bot::pump`](crate::Bot::pump), one frame at a time, and stops at the
//!   first close frame or read error;
//! - the **writer**, which drains the outbound queue onto the socket.
//!
//! There is no reconnect. Once the reader stops, the session is over.

use crate::{bot::Bot, outbox::OutboundMessage};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, info, warn};

/// Handle to the reader and writer tasks of one connection.
#[derive(Debug)]
pub struct Session {
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Session {
    /// Start both tasks over `socket`.
    pub(crate) fn spawn<S>(
        socket: S,
        bot: Bot,
        outbound: UnboundedReceiver<OutboundMessage>,
    ) -> Self
    where
        S: Stream<Item = Result<WsMessage, WsError>>
            + Sink<WsMessage, Error = WsError>
            + Send
            + 'static,
    {
        let (sink, stream) = socket.split();
        Self {
            reader: tokio::spawn(read_loop(stream, bot)),
            writer: tokio::spawn(write_loop(sink, outbound)),
        }
    }

    /// Wait until the socket closes, then stop the writer.
    pub async fn closed(self) {
        if let Err(error) = self.reader.await {
            if !error.is_cancelled() {
                warn!(%error, "socket reader ended abnormally");
            }
        }
        self.writer.abort();
    }

    /// Whether the reader has stopped.
    pub fn is_closed(&self) -> bool {
        self.reader.is_finished()
    }

    /// Stop both tasks without waiting for the peer.
    pub fn shutdown(&self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn read_loop<S>(mut stream: S, bot: Bot)
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                bot.pump(&text);
            }
            Ok(WsMessage::Close(frame)) => {
                info!(?frame, "socket closed by peer");
                return;
            }
            Ok(other) => debug!(kind = frame_kind(&other), "ignoring non-text frame"),
            Err(error) => {
                warn!(%error, "socket read failed");
                return;
            }
        }
    }
    info!("socket stream ended");
}

async fn write_loop<S>(mut sink: S, mut outbound: UnboundedReceiver<OutboundMessage>)
where
    S: Sink<WsMessage, Error = WsError> + Unpin,
{
    while let Some(message) = outbound.recv().await {
        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(error) => {
                warn!(id = message.id, %error, "could not encode outbound message");
                continue;
            }
        };
        if let Err(error) = sink.send(WsMessage::Text(frame)).await {
            warn!(id = message.id, %error, "socket write failed");
            return;
        }
        debug!(id = message.id, "sent message");
    }
    let _ = sink.close().await;
}

fn frame_kind(message: &WsMessage) -> &'static str {
    match message {
        WsMessage::Text(_) => "text",
        WsMessage::Binary(_) => "binary",
        WsMessage::Ping(_) => "ping",
        WsMessage::Pong(_) => "pong",
        WsMessage::Close(_) => "close",
        WsMessage::Frame(_) => "frame",
    }
}
