//! Single-assignment promises and futures with a callback combinator algebra.
//!
//! A [`Promise`] is resolved exactly once, from any thread. Every [`Future`]
//! taken from it observes that resolution through completion callbacks, and
//! combinators such as [`Future::map`], [`Future::flat_map`],
//! [`Future::combine`] or [`Future::adding_timeout`] build new futures whose
//! resolution is wired to their sources.
//!
//! ```
//! use promise_chain::Promise;
//! use std::thread;
//!
//! let promise = Promise::<i32>::new();
//! let doubled = promise.proxy().map(|n| n * 2);
//!
//! let producer = promise.clone();
//! thread::spawn(move || producer.fulfill(21));
//!
//! assert_eq!(doubled.wait().unwrap(), 42);
//! ```
use std::{
    any::Any,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};

mod aggregate;
mod shared;
pub mod executor;
mod future;
mod promise;
mod state;
mod time;
mod transform;
mod wait;

pub use aggregate::zip;
pub use executor::{Executor, Job, SerialExecutor, ThreadExecutor};
pub use future::{Future, Observable};
pub use promise::Promise;
pub use state::{Outcome, State};
pub use time::{delay, timeout};
pub use wait::Awaiting;

/// Everything a rejected future can carry.
///
/// User errors travel as [`Error::Custom`] and are forwarded untouched; the
/// remaining variants are produced by the crate itself.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("ensure condition failed")]
    EnsureConditionFailed,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("user closure panicked: {0}")]
    Panicked(String),
    #[error("completion was dropped before the future resolved")]
    Abandoned,
    #[error("{0}")]
    Custom(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wraps an arbitrary user error.
    pub fn custom<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Custom(Arc::new(error))
    }

    /// A plain message error.
    pub fn msg(message: impl Into<String>) -> Self {
        let boxed: Box<dyn std::error::Error + Send + Sync> = message.into().into();
        Error::Custom(Arc::from(boxed))
    }

    /// Borrows the user error if it is an `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Custom(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

/// Runs user code, turning a panic into [`Error::Panicked`].
pub(crate) fn guarded<R>(f: impl FnOnce() -> R) -> Result<R, Error> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| Error::Panicked(panic_message(&*payload)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
