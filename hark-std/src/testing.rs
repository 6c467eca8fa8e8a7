//! Testing utilities for hark.
//!
//! This module provides handlers and fixtures that make testing filters and
//! subscriptions easier.
//!
//! # Features
//!
//! - [`RecordingHandler`]: A handler that records every call it receives
//! - [`CountingHandler`]: A handler that counts invocations
//! - [`FailingHandler`]: A handler that always returns an error
//! - [`directory`] and [`event`]: Fixtures for building inputs

use hark_core::{BoxError, Captures, Directory, Entity, Event, Handler};
use serde_json::Value;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Fixtures
// ============================================================================

/// A small directory: users `neil -> n0`, `ada -> U2`; channels
/// `general -> CG0`, `random -> C1`.
pub fn directory() -> Directory {
    Directory::new(
        vec![Entity::new("n0", "neil"), Entity::new("U2", "ada")],
        vec![Entity::new("CG0", "general"), Entity::new("C1", "random")],
    )
}

/// Build an event from a JSON object.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn event(value: Value) -> Event {
    Event::try_from(value).expect("test events must be JSON objects")
}

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records every `(event, captures)` pair it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHandler::new();
/// registry.register("spy", filter, recorder.clone());
///
/// registry.dispatch(&event, &directory);
/// assert_eq!(recorder.calls().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<(Event, Captures)>>>,
}

impl RecordingHandler {
    /// Create a new recording handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<(Event, Captures)> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Handler for RecordingHandler {
    fn call(&self, event: &Event, captures: &Captures) -> Result<(), BoxError> {
        self.calls
            .lock()
            .unwrap()
            .push((event.clone(), captures.clone()));
        Ok(())
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations.
#[derive(Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Handler for CountingHandler {
    fn call(&self, _event: &Event, _captures: &Captures) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that always fails with the given message.
#[derive(Clone)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Create a handler failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Handler for FailingHandler {
    fn call(&self, _event: &Event, _captures: &Captures) -> Result<(), BoxError> {
        Err(self.message.clone().into())
    }
}
