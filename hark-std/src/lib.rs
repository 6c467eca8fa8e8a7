//! # hark-std
//!
//! Standard implementations for the hark chat client.
//!
//! This crate provides:
//! - **Matching**: [`matcher::evaluate`], the filter evaluation engine
//! - **Dispatch**: [`ListenerRegistry`], named subscriptions with one-shot
//!   and bulk removal
//! - **Standard handlers**: [`handlers::LoggingHandler`]
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use hark_core;

// Modules
pub mod handlers;
pub mod matcher;
pub mod registry;
pub mod testing;

pub use registry::{DispatchReport, ListenerRegistry, NamePattern, Persistence, Subscription};
