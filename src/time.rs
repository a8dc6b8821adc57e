use crate::{Error, Executor, Future, Promise};
use std::{sync::Arc, time::Duration};

/// A future fulfilled with `()` once `duration` has elapsed on `executor`.
pub fn delay(duration: Duration, executor: Arc<dyn Executor>) -> Future<()> {
    let promise = Promise::new();
    let sink = promise.clone();
    executor.schedule_after(duration, Box::new(move || sink.fulfill(())));
    promise.proxy()
}

/// A future that rejects with [`Error::Timeout`] once `duration` has elapsed.
pub fn timeout<T>(duration: Duration, executor: Arc<dyn Executor>) -> Future<T>
where
    T: Clone + Send + 'static,
{
    delay(duration, executor).try_map(move |()| Err(Error::Timeout(duration)))
}

impl<T> Future<T>
where
    T: Clone + Send + 'static,
{
    /// Bounds how long this future may take.
    ///
    /// Races it against [`timeout`]; if the bound elapses first the result is
    /// `Error::Timeout(duration)` and this future is cancelled.
    ///
    /// ```
    /// use promise_chain::{Error, Promise, ThreadExecutor};
    /// use std::{sync::Arc, time::Duration};
    ///
    /// let never = Promise::<i32>::new();
    /// let bounded = never
    ///     .proxy()
    ///     .adding_timeout(Duration::from_millis(20), Arc::new(ThreadExecutor::new()));
    /// assert!(matches!(bounded.wait(), Err(Error::Timeout(_))));
    /// ```
    pub fn adding_timeout(&self, duration: Duration, executor: Arc<dyn Executor>) -> Future<T> {
        let raced = self.racing([timeout(duration, executor)]);
        let source = self.cancel_hook();
        raced.catch(move |error| {
            if error.is_timeout() {
                tracing::debug!(?duration, "timeout elapsed before resolution, cancelling source");
                source();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Observable, ThreadExecutor};
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        thread,
        time::Instant,
    };

    fn executor() -> Arc<dyn Executor> {
        Arc::new(ThreadExecutor::named("timer"))
    }

    #[test]
    fn test_delay_fulfills_after_duration() {
        let start = Instant::now();
        delay(Duration::from_millis(30), executor()).wait().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_timeout_always_rejects() {
        let outcome = timeout::<String>(Duration::from_millis(10), executor()).wait();
        assert!(matches!(outcome, Err(Error::Timeout(d)) if d == Duration::from_millis(10)));
    }

    #[test]
    fn test_adding_timeout_cancels_slow_source() {
        let promise = Promise::<i32>::new();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        promise.on_cancel(move || flag.store(true, Ordering::SeqCst));
        let bounded = promise.proxy().adding_timeout(Duration::from_millis(20), executor());
        assert!(bounded.wait().unwrap_err().is_timeout());
        assert!(cancelled.load(Ordering::SeqCst));
        assert!(promise.is_pending());
    }

    #[test]
    fn test_adding_timeout_keeps_fast_result() {
        let promise = Promise::<i32>::new();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        promise.on_cancel(move || flag.store(true, Ordering::SeqCst));
        let bounded = promise.proxy().adding_timeout(Duration::from_millis(200), executor());
        let producer = promise.clone();
        thread::spawn(move || producer.fulfill(5));
        assert_eq!(bounded.wait().unwrap(), 5);
        assert!(!cancelled.load(Ordering::SeqCst));
        assert!(bounded.is_fulfilled());
    }
}
