//! Error types for hark.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`DecodeError`] - An inbound frame could not be turned into an event
//! - [`FilterError`] - A filter could not be built from its description
//! - [`CallbackError`] - A handler failed while processing an event

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while decoding an inbound frame.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The frame is not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame is valid JSON but not an object.
    #[error("frame is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Errors that can occur while building a filter.
#[derive(Error, Debug)]
pub enum FilterError {
    /// The filter description is not a JSON object.
    #[error("filter must be a JSON object, got a {0}")]
    NotAnObject(&'static str),

    /// A pattern expectation failed to compile.
    #[error("invalid pattern for field `{field}`")]
    InvalidPattern {
        /// The field the pattern was declared for.
        field: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The expected value has a shape no expectation can be built from.
    #[error("unsupported expected value for field `{field}`: {kind}")]
    UnsupportedValue {
        /// The field the value was declared for.
        field: String,
        /// The JSON kind of the rejected value.
        kind: &'static str,
    },
}

/// Errors raised by a handler during dispatch.
///
/// These never abort a dispatch pass; the registry logs them and moves on
/// to the next subscription.
#[derive(Error, Debug)]
pub enum CallbackError {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Failed(#[source] BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl From<BoxError> for CallbackError {
    fn from(err: BoxError) -> Self {
        CallbackError::Failed(err)
    }
}

/// Human-readable name of a JSON value's kind.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
