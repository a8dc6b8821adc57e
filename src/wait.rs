//! Ways to get at a result without writing a completion by hand: blocking on
//! a channel, or awaiting from any async executor.
use crate::{Error, Future, Outcome};
use parking_lot::Mutex;
use std::{
    future::IntoFuture,
    pin::Pin,
    sync::{mpsc::channel, Arc},
    task::{Context, Poll, Waker},
    time::Duration,
};

impl<T> Future<T>
where
    T: Clone + Send + 'static,
{
    /// Blocks the current thread until the future resolves.
    ///
    /// Returns `Err(Error::Abandoned)` if the completion was dropped without
    /// being run, e.g. by an executor that failed to schedule it.
    pub fn wait(&self) -> Outcome<T> {
        let (sender, receiver) = channel();
        self.submit(move |outcome| {
            let _ = sender.send(outcome);
        });
        receiver.recv().unwrap_or(Err(Error::Abandoned))
    }

    /// Like [`wait`](Self::wait) but gives up after `duration`, returning
    /// `None`.
    pub fn wait_timeout(&self, duration: Duration) -> Option<Outcome<T>> {
        let (sender, receiver) = channel();
        self.submit(move |outcome| {
            let _ = sender.send(outcome);
        });
        receiver.recv_timeout(duration).ok()
    }
}

#[derive(Debug)]
enum WakerState {
    Fresh,
    Tainted,
}

struct Slot<T> {
    value: Option<Outcome<T>>,
    waker: Result<Waker, WakerState>,
}

/// Completion side of an [`Awaiting`]; wakes the task on delivery, or on drop
/// if it never delivered.
struct Notifier<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Notifier<T> {
    fn deliver(self, outcome: Outcome<T>) {
        let mut slot = self.slot.lock();
        slot.value = Some(outcome);
        if let Ok(waker) = std::mem::replace(&mut slot.waker, Err(WakerState::Tainted)) {
            waker.wake();
        }
    }
}

impl<T> Drop for Notifier<T> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        if let Ok(waker) = std::mem::replace(&mut slot.waker, Err(WakerState::Tainted)) {
            waker.wake();
        }
    }
}

/// The [`std::future::Future`] returned by `Future::into_future`, so a
/// [`Future`] can be `.await`ed.
///
/// ```
/// use promise_chain::Promise;
/// use futures::executor::block_on;
/// use std::thread;
///
/// let promise = Promise::<String>::new();
/// let future = promise.proxy();
/// let task = thread::spawn(move || block_on(async { future.await }));
/// promise.fulfill("Hi".into());
/// assert_eq!(task.join().expect("The task thread has panicked.").unwrap(), "Hi");
/// ```
pub struct Awaiting<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> std::future::Future for Awaiting<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.lock();
        match slot.value.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => match std::mem::replace(&mut slot.waker, Ok(cx.waker().clone())) {
                Err(WakerState::Tainted) => Poll::Ready(Err(Error::Abandoned)),
                _ => Poll::Pending,
            },
        }
    }
}

impl<T> IntoFuture for Future<T>
where
    T: Clone + Send + 'static,
{
    type Output = Outcome<T>;
    type IntoFuture = Awaiting<T>;

    fn into_future(self) -> Self::IntoFuture {
        let slot = Arc::new(Mutex::new(Slot {
            value: None,
            waker: Err(WakerState::Fresh),
        }));
        let notifier = Notifier { slot: slot.clone() };
        self.submit(move |outcome| notifier.deliver(outcome));
        Awaiting { slot }
    }
}
