//! Logging handler for event observation.

use hark_core::{BoxError, Captures, Event, Handler};
use tracing::{Level, debug, info};

/// A handler that logs every event it receives.
///
/// Registered with an empty filter it acts as a raw event tap, which is
/// handy when working out what a platform actually sends.
#[derive(Debug, Clone, Copy)]
pub struct LoggingHandler {
    level: Level,
}

impl LoggingHandler {
    /// Log at `info`.
    pub fn new() -> Self {
        Self { level: Level::INFO }
    }

    /// Log at `debug` instead, including the full payload.
    pub fn verbose() -> Self {
        Self { level: Level::DEBUG }
    }
}

impl Default for LoggingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for LoggingHandler {
    fn call(&self, event: &Event, captures: &Captures) -> Result<(), BoxError> {
        let event_type = event.event_type().unwrap_or_default();
        let channel = event.channel().unwrap_or_default();
        let user = event.user().unwrap_or_default();

        if self.level == Level::DEBUG {
            debug!(
                event_type,
                channel,
                user,
                captures = ?captures.as_slice(),
                payload = ?event.fields(),
                "received event"
            );
        } else {
            info!(
                event_type,
                channel,
                user,
                text = event.text().unwrap_or_default(),
                "received event"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::event;
    use serde_json::json;

    #[test]
    fn test_logging_handler_never_fails() {
        let ev = event(json!({"type": "message", "text": "hi"}));
        assert!(LoggingHandler::new().call(&ev, &Captures::new()).is_ok());
        assert!(
            LoggingHandler::verbose()
                .call(&event(json!({})), &Captures::new())
                .is_ok()
        );
    }
}
