//! Combinators deriving a future from a single source.
//!
//! Each one wires a fresh promise to the source through a completion, so the
//! user closure runs exactly once, when the source resolves, on the thread
//! that resolved it.
use crate::{guarded, shared::CancelHook, Error, Executor, Future, Outcome, Promise};
use parking_lot::Mutex;
use std::sync::Arc;

impl<T> Future<T>
where
    T: Clone + Send + 'static,
{
    /// Builds a future settled by `wire` once this one resolves. Cancelling it
    /// cancels this future.
    fn derive<U, F>(&self, wire: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(Outcome<T>, Promise<U>) + Send + 'static,
    {
        let promise = Promise::new();
        let sink = promise.clone();
        self.submit(move |outcome| wire(outcome, sink));
        Future::derived(promise.core(), self.cancel_hook())
    }

    /// Like [`derive`](Self::derive) for combinators that continue with a
    /// second future; cancellation reaches that one too once it exists.
    fn derive_chained<U, F>(&self, wire: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(Outcome<T>) -> Result<Future<U>, Error> + Send + 'static,
    {
        let next: Arc<Mutex<Option<CancelHook>>> = Arc::new(Mutex::new(None));
        let source = self.cancel_hook();
        let chained = next.clone();
        let cancel: CancelHook = Arc::new(move || {
            source();
            let hook = chained.lock().clone();
            if let Some(hook) = hook {
                hook();
            }
        });

        let promise = Promise::new();
        let sink = promise.clone();
        self.submit(move |outcome| match wire(outcome) {
            Ok(future) => {
                *next.lock() = Some(future.cancel_hook());
                future.submit(move |outcome| sink.settle(outcome));
            }
            Err(error) => sink.reject(error),
        });
        Future::derived(promise.core(), cancel)
    }

    /// Transforms the value. Errors pass through without calling `transform`.
    ///
    /// ```
    /// use promise_chain::Future;
    ///
    /// let len = Future::fulfilled("four".to_owned()).map(|s| s.len());
    /// assert_eq!(len.wait().unwrap(), 4);
    /// ```
    pub fn map<U, F>(&self, transform: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.try_map(move |value| Ok(transform(value)))
    }

    /// Transforms the value with a fallible function; its error rejects the
    /// derived future.
    pub fn try_map<U, F>(&self, transform: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Result<U, Error> + Send + 'static,
    {
        self.derive(move |outcome, promise| {
            promise.settle(outcome.and_then(|value| guarded(|| transform(value)).and_then(|r| r)));
        })
    }

    /// Continues with the future returned by `transform`. Not called if this
    /// future rejects.
    pub fn flat_map<U, F>(&self, transform: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Future<U> + Send + 'static,
    {
        self.derive_chained(move |outcome| outcome.and_then(|value| guarded(|| transform(value))))
    }

    /// Rejects with [`Error::EnsureConditionFailed`] unless `predicate` holds.
    pub fn ensure<F>(&self, predicate: F) -> Future<T>
    where
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        self.derive(move |outcome, promise| {
            promise.settle(outcome.and_then(|value| match guarded(|| predicate(&value)) {
                Ok(true) => Ok(value),
                Ok(false) => Err(Error::EnsureConditionFailed),
                Err(error) => Err(error),
            }));
        })
    }

    /// Substitutes a failure with the future produced by `recovery`.
    pub fn recover<F>(&self, recovery: F) -> Future<T>
    where
        F: FnOnce(Error) -> Future<T> + Send + 'static,
    {
        self.derive_chained(move |outcome| match outcome {
            Ok(value) => Ok(Future::fulfilled(value)),
            Err(error) => guarded(|| recovery(error)),
        })
    }

    /// Runs `side_effect` on either branch. Returns a handle on the same
    /// future.
    pub fn always<F>(&self, side_effect: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(move |_| side_effect());
        self.clone()
    }

    /// Delivers completions registered on the returned future through
    /// `executor` rather than on the resolving thread.
    pub fn dispatch(&self, executor: Arc<dyn Executor>) -> Future<T> {
        self.with_executor(executor)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Future, Observable, Promise};
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    #[test]
    fn test_map_after_resolution() {
        let promise = Promise::<i32>::new();
        let mapped = promise.proxy().map(|n| n.to_string());
        assert!(mapped.is_pending());
        promise.fulfill(10);
        assert_eq!(mapped.current_value(), Some("10".to_owned()));
    }

    #[test]
    fn test_try_map_error_rejects() {
        let mapped = Future::fulfilled(1).try_map(|_| Err::<u8, _>(Error::msg("bad")));
        assert_eq!(mapped.current_error().map(|e| e.to_string()), Some("bad".into()));
    }

    #[test]
    fn test_map_panic_becomes_rejection() {
        let mapped = Future::fulfilled(0).map(|n: i32| {
            if n == 0 {
                panic!("division by zero");
            }
            10 / n
        });
        assert!(matches!(mapped.current_error(), Some(Error::Panicked(m)) if m == "division by zero"));
    }

    #[test]
    fn test_flat_map_skipped_on_rejection() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let chained = Future::<i32>::rejected(Error::EnsureConditionFailed).flat_map(move |n| {
            flag.store(true, Ordering::SeqCst);
            Future::fulfilled(n + 1)
        });
        assert!(matches!(chained.current_error(), Some(Error::EnsureConditionFailed)));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_flat_map_forwards_inner_result() {
        let inner = Promise::<String>::new();
        let handle = inner.clone();
        let outer = Promise::<i32>::new();
        let chained = outer.proxy().flat_map(move |_| handle.proxy());
        outer.fulfill(1);
        assert!(chained.is_pending());
        inner.fulfill("done".into());
        assert_eq!(chained.current_value(), Some("done".to_owned()));
    }

    #[test]
    fn test_flat_map_cancel_reaches_inner() {
        let inner = Promise::<i32>::new();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        inner.on_cancel(move || flag.store(true, Ordering::SeqCst));
        let handle = inner.clone();
        let chained = Future::fulfilled(()).flat_map(move |_| handle.proxy());
        chained.cancel();
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn test_ensure() {
        let good = Future::fulfilled(10).ensure(|x| *x > 0);
        assert_eq!(good.current_value(), Some(10));
        let bad = Future::fulfilled(-5).ensure(|x| *x > 0);
        assert!(matches!(bad.current_error(), Some(Error::EnsureConditionFailed)));
    }

    #[test]
    fn test_ensure_passes_source_error_through() {
        let failed = Future::<i32>::rejected(Error::msg("source")).ensure(|_| true);
        assert_eq!(failed.current_error().map(|e| e.to_string()), Some("source".into()));
    }

    #[test]
    fn test_recover_substitutes_failure() {
        let promise = Promise::<i32>::new();
        let recovered = promise.proxy().recover(|_| Future::fulfilled(10));
        promise.reject(Error::msg("a"));
        assert_eq!(recovered.current_value(), Some(10));
    }

    #[test]
    fn test_recover_leaves_success_alone() {
        let recovered = Future::fulfilled(3).recover(|_| Future::fulfilled(10));
        assert_eq!(recovered.current_value(), Some(3));
    }

    #[test]
    fn test_recover_panic_rejects() {
        let recovered =
            Future::<i32>::rejected(Error::msg("a")).recover(|_| panic!("no fallback"));
        assert!(matches!(recovered.current_error(), Some(Error::Panicked(_))));
    }

    #[test]
    fn test_always_runs_on_both_branches() {
        for outcome in [Ok(1), Err(Error::msg("x"))] {
            let promise = Promise::<i32>::new();
            let ran = Arc::new(AtomicBool::new(false));
            let flag = ran.clone();
            promise.proxy().always(move || flag.store(true, Ordering::SeqCst));
            promise.settle(outcome);
            assert!(ran.load(Ordering::SeqCst));
        }
    }
}
