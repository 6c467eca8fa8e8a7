//! Listener registry for runtime subscription management.
//!
//! The registry owns every [`Subscription`] and decides its lifetime:
//!
//! ```text
//! Active ──(drop / one-shot fired)──▶ Removed
//! ```
//!
//! # Dispatch Contract
//!
//! [`ListenerRegistry::dispatch`] takes a snapshot of the subscription list
//! when the pass starts and evaluates every entry of that snapshot against
//! the event. Registrations and drops made while the pass runs (including
//! from inside handlers) apply to the next pass, so no subscription is
//! skipped or visited twice. The one exception is a one-shot subscription:
//! it is retired before its handler runs and can never fire again, even from
//! a nested dispatch started by that handler.
//!
//! Handler failures and panics are contained per subscription; the pass
//! carries on with the remaining entries.

use crate::matcher::evaluate;
use hark_core::{CallbackError, Captures, Directory, Event, Filter, Handler, MatchResult};
use parking_lot::Mutex;
use regex::Regex;
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tracing::{debug, error, info_span, warn};

/// Pattern token that selects every subscription.
pub const WILDCARD: &str = "*";

/// How long a subscription stays registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Until dropped.
    Persistent,
    /// Until it fires once, or until dropped.
    Once,
}

/// A registered `(filter, handler, name, persistence)` entry.
pub struct Subscription {
    name: String,
    filter: Filter,
    handler: Box<dyn Handler>,
    persistence: Persistence,
    active: AtomicBool,
}

impl Subscription {
    /// Create a new active subscription.
    pub fn new<H: Handler>(
        name: impl Into<String>,
        filter: Filter,
        handler: H,
        persistence: Persistence,
    ) -> Self {
        Self {
            name: name.into(),
            filter,
            handler: Box::new(handler),
            persistence,
            active: AtomicBool::new(true),
        }
    }

    /// The name given at registration. Only used for dropping.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The filter this subscription matches with.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Whether this subscription survives firing.
    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    /// Whether this subscription is still active.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Move to `Removed`. Returns `true` for the caller that made the move.
    fn retire(&self) -> bool {
        self.active
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Run the handler inside a span, turning errors and panics into values.
    fn invoke(&self, event: &Event, captures: &Captures) -> Result<(), CallbackError> {
        let span = info_span!("listener", name = %self.name);
        let _entered = span.enter();

        match panic::catch_unwind(AssertUnwindSafe(|| self.handler.call(event, captures))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(CallbackError::Failed(source)),
            Err(payload) => Err(CallbackError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .field("persistence", &self.persistence)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ============================================================================
// NamePattern - selecting subscriptions to drop
// ============================================================================

/// Selects subscriptions by name.
///
/// - `"*"` selects everything.
/// - Any other string selects exactly that name.
/// - A [`Regex`] selects names whose leftmost match covers the whole name
///   (`cool.*` selects `cool_grand` but not `yepcoolgreat`). The regex is
///   used as built, so [`RegexBuilder`](regex::RegexBuilder) options such
///   as case insensitivity apply. With alternations, list the longer
///   alternative first (`ab|a`).
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Every name.
    All,
    /// One exact name.
    Exact(String),
    /// Names matched in full by the pattern.
    Regex(Regex),
}

impl NamePattern {
    /// Whether `name` is selected.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::All => true,
            NamePattern::Exact(exact) => exact == name,
            NamePattern::Regex(pattern) => pattern
                .find(name)
                .is_some_and(|m| m.range() == (0..name.len())),
        }
    }

    /// Whether the pattern is empty, which is a usage mistake.
    pub fn is_blank(&self) -> bool {
        match self {
            NamePattern::All => false,
            NamePattern::Exact(exact) => exact.is_empty(),
            NamePattern::Regex(pattern) => pattern.as_str().is_empty(),
        }
    }
}

impl From<&str> for NamePattern {
    fn from(value: &str) -> Self {
        if value == WILDCARD {
            NamePattern::All
        } else {
            NamePattern::Exact(value.to_string())
        }
    }
}

impl From<String> for NamePattern {
    fn from(value: String) -> Self {
        NamePattern::from(value.as_str())
    }
}

impl From<Regex> for NamePattern {
    fn from(value: Regex) -> Self {
        NamePattern::Regex(value)
    }
}

impl From<&Regex> for NamePattern {
    fn from(value: &Regex) -> Self {
        NamePattern::from(value.clone())
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePattern::All => f.write_str(WILDCARD),
            NamePattern::Exact(exact) => write!(f, "{exact:?}"),
            NamePattern::Regex(pattern) => write!(f, "/{}/", pattern.as_str()),
        }
    }
}

// ============================================================================
// ListenerRegistry
// ============================================================================

/// Summary of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Subscriptions in the snapshot.
    pub evaluated: usize,
    /// Subscriptions whose filter matched and whose handler ran.
    pub invoked: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// The set of active subscriptions.
///
/// # Example
///
/// ```rust
/// use hark_core::{Captures, Directory, Event, Filter};
/// use hark_std::ListenerRegistry;
///
/// let registry = ListenerRegistry::new();
/// registry.register("greeter", Filter::new().field("text", "hi"), |_: &Event, _: &Captures| {
///     println!("hello back");
/// });
///
/// let event = Event::decode(r#"{"text":"hi"}"#).unwrap();
/// let report = registry.dispatch(&event, &Directory::default());
/// assert_eq!(report.invoked, 1);
///
/// assert_eq!(registry.drop_by_name("*"), 1);
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    subscriptions: Mutex<Vec<Arc<Subscription>>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a persistent subscription.
    pub fn register<H: Handler>(&self, name: impl Into<String>, filter: Filter, handler: H) {
        self.insert(Subscription::new(
            name,
            filter,
            handler,
            Persistence::Persistent,
        ));
    }

    /// Register a subscription removed after its first match.
    pub fn register_once<H: Handler>(&self, name: impl Into<String>, filter: Filter, handler: H) {
        self.insert(Subscription::new(name, filter, handler, Persistence::Once));
    }

    /// Append a prepared subscription.
    pub fn insert(&self, subscription: Subscription) {
        debug!(
            name = %subscription.name,
            persistence = ?subscription.persistence,
            fields = subscription.filter.len(),
            "registered listener"
        );
        self.subscriptions.lock().push(Arc::new(subscription));
    }

    /// Remove every subscription whose name is selected by `pattern`.
    ///
    /// Returns how many were removed. An empty pattern is logged and ignored.
    pub fn drop_by_name(&self, pattern: impl Into<NamePattern>) -> usize {
        let pattern = pattern.into();
        if pattern.is_blank() {
            warn!("drop called with an empty name pattern; ignoring");
            return 0;
        }

        let mut subscriptions = self.subscriptions.lock();
        let before = subscriptions.len();
        subscriptions.retain(|subscription| {
            if pattern.matches(subscription.name()) {
                subscription.retire();
                false
            } else {
                true
            }
        });
        let removed = before - subscriptions.len();
        drop(subscriptions);

        debug!(%pattern, removed, "dropped listeners");
        removed
    }

    /// Evaluate every active subscription against `event` and run the
    /// handlers of those that match.
    pub fn dispatch(&self, event: &Event, directory: &Directory) -> DispatchReport {
        let snapshot = self.snapshot();
        let mut report = DispatchReport {
            evaluated: snapshot.len(),
            ..DispatchReport::default()
        };

        for subscription in &snapshot {
            let MatchResult::Matched(captures) = evaluate(&subscription.filter, event, directory)
            else {
                continue;
            };

            if subscription.persistence == Persistence::Once {
                if !subscription.retire() {
                    continue;
                }
                self.remove(subscription);
            }

            report.invoked += 1;
            if let Err(error) = subscription.invoke(event, &captures) {
                report.failed += 1;
                error!(listener = %subscription.name, %error, "listener failed");
            }
        }

        debug!(
            event_type = event.event_type().unwrap_or_default(),
            evaluated = report.evaluated,
            invoked = report.invoked,
            "dispatched event"
        );
        report
    }

    /// A copy of the current subscription list.
    pub fn snapshot(&self) -> Vec<Arc<Subscription>> {
        self.subscriptions.lock().clone()
    }

    /// Names of the active subscriptions, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.subscriptions
            .lock()
            .iter()
            .map(|subscription| subscription.name.clone())
            .collect()
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Whether there are no active subscriptions.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.lock().is_empty()
    }

    fn remove(&self, subscription: &Arc<Subscription>) {
        self.subscriptions
            .lock()
            .retain(|candidate| !Arc::ptr_eq(candidate, subscription));
    }
}
