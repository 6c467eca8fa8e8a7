//! # hark-core
//!
//! Core types for the hark real-time chat client.
//!
//! This crate has minimal dependencies and is meant to be imported by code
//! that only needs to describe events and filters, without pulling in the
//! registry or the network client.
//!
//! # Building Blocks
//!
//! ## Events ([`Event`])
//!
//! One decoded inbound frame. An event is an opaque, read-only JSON object;
//! no field is mandatory and a missing field is a normal state.
//!
//! ## Field Resolution ([`field`])
//!
//! Turns a field name (plain, dotted, or the `filename` alias) into the value
//! it designates inside an event.
//!
//! ## Directory ([`Directory`])
//!
//! The user and channel snapshot loaded once at connection start. Resolves a
//! human-readable name, optionally prefixed with a sigil, to a stable id.
//!
//! ## Filters ([`Filter`], [`Expect`])
//!
//! A declarative, ordered list of `(field, expectation)` pairs. Evaluating a
//! filter yields a [`MatchResult`] carrying the regex [`Captures`].
//!
//! ## Handlers ([`Handler`])
//!
//! The callback invoked for a matching event. Closures taking
//! `(&Event, &Captures)` are handlers.
//!
//! # Error Types
//!
//! - [`DecodeError`] - Inbound frame decoding errors
//! - [`FilterError`] - Filter construction errors
//! - [`CallbackError`] - Handler failures caught at dispatch

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod directory;
mod error;
mod event;
pub mod field;
mod filter;
mod handler;
mod matches;

// Re-exports
pub use directory::{CHANNEL_SIGIL, Directory, Entity, IdConvention, USER_SIGIL};
pub use error::{BoxError, CallbackError, DecodeError, FilterError};
pub use event::Event;
pub use filter::{CHANNEL_FIELD, Expect, Filter, USER_FIELD};
pub use handler::{Handler, IntoOutcome};
pub use matches::{Captures, MatchResult};
