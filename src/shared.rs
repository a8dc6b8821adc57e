//! The state shared by a promise and every future observing it.
//!
//! A `Core` is the only place where mutation happens. Its lock guards the
//! resolution state, the buffered callbacks and the cancel hook together, so
//! a registration can never slip between a pending check and the append.
//! Callbacks are always invoked after the lock is released.
use crate::{guarded, Outcome, State};
use parking_lot::Mutex;
use std::{fmt, sync::Arc};

pub(crate) type Callback<T> = Box<dyn FnOnce(Outcome<T>) + Send + 'static>;
pub(crate) type CancelHook = Arc<dyn Fn() + Send + Sync + 'static>;

pub(crate) struct Core<T> {
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    state: State<T>,
    callbacks: Vec<Callback<T>>,
    on_cancel: Option<CancelHook>,
}

/// Runs one completion. A panicking completion is logged and swallowed so the
/// ones after it still run and the resolving thread never unwinds.
fn fire<T>(callback: Callback<T>, outcome: Outcome<T>) {
    if let Err(error) = guarded(move || callback(outcome)) {
        tracing::error!(%error, "completion callback panicked");
    }
}

impl<T> fmt::Debug for Core<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Core")
            .field("state", &inner.state)
            .field("callbacks", &inner.callbacks.len())
            .finish()
    }
}

impl<T> Core<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn new() -> Arc<Self> {
        Self::with_state(State::Pending)
    }

    pub(crate) fn settled(outcome: Outcome<T>) -> Arc<Self> {
        Self::with_state(State::from(outcome))
    }

    fn with_state(state: State<T>) -> Arc<Self> {
        Arc::new(Core {
            inner: Mutex::new(Inner {
                state,
                callbacks: vec![],
                on_cancel: None,
            }),
        })
    }

    /// Moves a pending core to its terminal state and fires the buffered
    /// callbacks in registration order. Returns `false` when the core was
    /// already terminal, in which case nothing changes.
    pub(crate) fn transition(&self, outcome: Outcome<T>) -> bool {
        let callbacks = {
            let mut inner = self.inner.lock();
            if !inner.state.is_pending() {
                tracing::debug!(
                    rejected = outcome.is_err(),
                    "ignoring resolution of an already settled promise"
                );
                return false;
            }
            inner.state = State::from(outcome.clone());
            inner.on_cancel = None;
            std::mem::take(&mut inner.callbacks)
        };
        tracing::trace!(callbacks = callbacks.len(), "promise settled");
        let mut callbacks = callbacks.into_iter().peekable();
        while let Some(callback) = callbacks.next() {
            if callbacks.peek().is_some() {
                fire(callback, outcome.clone());
            } else {
                fire(callback, outcome);
                break;
            }
        }
        true
    }

    /// Buffers `callback` while pending, otherwise runs it right away with the
    /// terminal outcome.
    pub(crate) fn register(&self, callback: Callback<T>) {
        let outcome = {
            let mut inner = self.inner.lock();
            match inner.state.outcome() {
                Some(outcome) => outcome,
                None => {
                    inner.callbacks.push(callback);
                    return;
                }
            }
        };
        fire(callback, outcome);
    }

    pub(crate) fn set_cancel_hook(&self, hook: CancelHook) {
        let mut inner = self.inner.lock();
        if inner.state.is_pending() {
            inner.on_cancel = Some(hook);
        }
    }

    /// Runs the cancel hook if the core is still pending. Never transitions.
    pub(crate) fn cancel(&self) {
        let hook = {
            let inner = self.inner.lock();
            if !inner.state.is_pending() {
                return;
            }
            inner.on_cancel.clone()
        };
        if let Some(hook) = hook {
            tracing::trace!("running cancel hook");
            hook();
        }
    }

    pub(crate) fn state(&self) -> State<T> {
        self.inner.lock().state.clone()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.inner.lock().state.is_pending()
    }
}
