use crate::{
    shared::{CancelHook, Core},
    Error, Executor, Outcome, State,
};
use std::{fmt, sync::Arc};

/// The observing side shared by every kind of future.
///
/// Futures taken from a [`Promise`](crate::Promise) and futures built by
/// combinators are the same concrete [`Future`] type; code that only needs to
/// watch for a result can be written against this trait instead.
pub trait Observable<T>: Send + Sync {
    /// Registers a completion. Runs immediately if already resolved.
    fn submit_boxed(&self, completion: Box<dyn FnOnce(Outcome<T>) + Send + 'static>);

    /// Asks the producers behind this future to stop. Advisory only.
    fn cancel(&self);

    /// A snapshot of the resolution state.
    fn state(&self) -> State<T>;

    fn current_value(&self) -> Option<T>
    where
        T: Clone,
    {
        self.state().value().cloned()
    }

    fn current_error(&self) -> Option<Error> {
        self.state().error().cloned()
    }

    fn is_pending(&self) -> bool {
        self.state().is_pending()
    }

    fn is_fulfilled(&self) -> bool {
        self.state().is_fulfilled()
    }

    fn is_rejected(&self) -> bool {
        self.state().is_rejected()
    }
}

/// A read-only handle on a value or error that arrives later.
///
/// Cloning a `Future` is cheap and yields another handle on the same
/// resolution.
pub struct Future<T> {
    core: Arc<Core<T>>,
    cancel: CancelHook,
    executor: Option<Arc<dyn Executor>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            cancel: self.cancel.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("core", &self.core)
            .field("dispatched", &self.executor.is_some())
            .finish()
    }
}

impl<T> Future<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn live(core: Arc<Core<T>>) -> Self {
        let target = core.clone();
        Self {
            core,
            cancel: Arc::new(move || target.cancel()),
            executor: None,
        }
    }

    /// A future over `core` whose cancellation is routed to `cancel`
    /// instead of the core's own hook.
    pub(crate) fn derived(core: Arc<Core<T>>, cancel: CancelHook) -> Self {
        Self {
            core,
            cancel,
            executor: None,
        }
    }

    /// An already fulfilled future.
    pub fn fulfilled(value: T) -> Self {
        Self::live(Core::settled(Ok(value)))
    }

    /// An already rejected future.
    pub fn rejected(error: Error) -> Self {
        Self::live(Core::settled(Err(error)))
    }

    pub(crate) fn cancel_hook(&self) -> CancelHook {
        self.cancel.clone()
    }

    pub(crate) fn with_executor(&self, executor: Arc<dyn Executor>) -> Self {
        Self {
            core: self.core.clone(),
            cancel: self.cancel.clone(),
            executor: Some(executor),
        }
    }

    /// Registers `completion` to run once with the outcome.
    ///
    /// Completions registered before resolution run in registration order on
    /// the resolving thread; later ones run immediately on the caller's
    /// thread. A [`dispatch`](Self::dispatch)ed future hands them to its
    /// executor instead.
    pub fn submit<F>(&self, completion: F)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        match &self.executor {
            Some(executor) => {
                let executor = executor.clone();
                self.core.register(Box::new(move |outcome| {
                    executor.schedule(Box::new(move || completion(outcome)));
                }));
            }
            None => self.core.register(Box::new(completion)),
        }
    }

    /// Runs the cancellation hooks of this future's lineage.
    ///
    /// Nothing is resolved by cancelling; producers observe their hook and
    /// decide whether to resolve. No effect on resolved promises.
    pub fn cancel(&self) {
        (self.cancel)();
    }

    pub fn state(&self) -> State<T> {
        self.core.state()
    }

    /// Observes the success branch. Returns a handle on the same future.
    pub fn then<F>(&self, on_value: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.submit(move |outcome| {
            if let Ok(value) = outcome {
                on_value(value);
            }
        });
        self.clone()
    }

    /// Observes the failure branch. Returns a handle on the same future.
    pub fn catch<F>(&self, on_error: F) -> Self
    where
        F: FnOnce(Error) + Send + 'static,
    {
        self.submit(move |outcome| {
            if let Err(error) = outcome {
                on_error(error);
            }
        });
        self.clone()
    }
}

impl<T> Observable<T> for Future<T>
where
    T: Clone + Send + 'static,
{
    fn submit_boxed(&self, completion: Box<dyn FnOnce(Outcome<T>) + Send + 'static>) {
        self.submit(completion);
    }

    fn cancel(&self) {
        Future::cancel(self);
    }

    fn state(&self) -> State<T> {
        Future::state(self)
    }
}
