use crate::{shared::Core, Error, Future, Outcome};
use std::{fmt, sync::Arc};

/// The writing half. A `Promise` resolves its futures exactly once; every
/// later `fulfill` or `reject` is ignored.
///
/// Promises can be cloned and handed to several producers, the first one to
/// resolve wins.
///
/// # Examples
///
/// ```
/// use promise_chain::Promise;
/// use std::thread;
///
/// let promise = Promise::<String>::new();
/// let first = promise.proxy();
/// let second = promise.proxy();
///
/// let producer = promise.clone();
/// let task = thread::spawn(move || producer.fulfill("Hi".into()));
/// task.join().expect("The producer thread has panicked.");
///
/// assert_eq!(first.wait().unwrap(), "Hi");
/// assert_eq!(second.wait().unwrap(), "Hi");
/// ```
pub struct Promise<T> {
    core: Arc<Core<T>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").field("core", &self.core).finish()
    }
}

impl<T> Default for Promise<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Promise<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self { core: Core::new() }
    }

    /// Creates a promise and hands a clone of it to `work`, which is expected
    /// to resolve it now or later.
    ///
    /// ```
    /// use promise_chain::Promise;
    /// use std::thread;
    ///
    /// let promise = Promise::<i32>::performing(|p| {
    ///     thread::spawn(move || p.fulfill(10));
    /// });
    /// assert_eq!(promise.proxy().wait().unwrap(), 10);
    /// ```
    pub fn performing<F>(work: F) -> Self
    where
        F: FnOnce(Promise<T>),
    {
        let promise = Self::new();
        work(promise.clone());
        promise
    }

    pub fn fulfill(&self, value: T) {
        self.settle(Ok(value));
    }

    pub fn reject(&self, error: Error) {
        self.settle(Err(error));
    }

    /// Resolves with either branch. A no-op if already resolved.
    pub fn settle(&self, outcome: Outcome<T>) {
        self.core.transition(outcome);
    }

    /// Installs the hook run when a future of this promise is cancelled.
    ///
    /// Cancelling never resolves the promise; the hook is how the producer
    /// learns it may stop working. Has no effect once resolved.
    pub fn on_cancel<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.core.set_cancel_hook(Arc::new(hook));
    }

    pub fn is_pending(&self) -> bool {
        self.core.is_pending()
    }

    /// A future observing this promise. Any number may be taken.
    pub fn proxy(&self) -> Future<T> {
        Future::live(self.core.clone())
    }

    pub(crate) fn core(&self) -> Arc<Core<T>> {
        self.core.clone()
    }
}
