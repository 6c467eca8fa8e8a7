//! # Handlers
//!
//! The callback side of a subscription: the code that runs once a filter
//! has matched an event.
//!
//! # Usage Patterns
//!
//! 1. **Closure**: `|event: &Event, captures: &Captures| { ... }`
//! 2. **Struct implementation**: `impl Handler for MyHandler`
//!
//! Handlers run synchronously inside the dispatch pass, one event at a time.
//! Work that needs to await should be moved into a spawned task; the
//! dispatch pass does not wait for it.
//!
//! Closures should annotate their argument types so that the borrows are
//! inferred as higher-ranked:
//!
//! ```rust
//! use hark_core::{Captures, Event, Handler};
//!
//! let greet = |event: &Event, captures: &Captures| {
//!     println!("{:?} said {:?}", event.user(), captures.get(0));
//! };
//!
//! fn assert_handler<H: Handler>(_: &H) {}
//! assert_handler(&greet);
//! ```

use crate::{error::BoxError, event::Event, matches::Captures};

/// Conversion of a handler's return value into its outcome.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<T, E>` → delegates to `T`, or fails with `E`
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `IntoOutcome`",
    label = "handlers must return `()` or a `Result`",
    note = "IntoOutcome must implement the `into_outcome` method."
)]
pub trait IntoOutcome {
    /// Convert the return value into success or a boxed error.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => Err(e.into()),
        }
    }
}

/// The callback of a subscription.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a `Handler`",
    label = "missing `Handler` implementation",
    note = "Closures must take `(&Event, &Captures)`; annotate the argument types."
)]
pub trait Handler: Send + Sync + 'static {
    /// Process one matching event.
    fn call(&self, event: &Event, captures: &Captures) -> Result<(), BoxError>;
}

// Blanket impl for closures
impl<F, R> Handler for F
where
    F: Fn(&Event, &Captures) -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    fn call(&self, event: &Event, captures: &Captures) -> Result<(), BoxError> {
        (self)(event, captures).into_outcome()
    }
}
