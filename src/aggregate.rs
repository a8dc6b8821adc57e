//! Combinators over several sources: `combine`, `zip` and `racing`.
//!
//! The bookkeeping of each combinator sits behind its own mutex, which is
//! never held while a source or the derived promise is touched.
use crate::{shared::CancelHook, Future, Promise};
use parking_lot::Mutex;
use std::{iter, sync::Arc};

fn cancel_all(hooks: Vec<CancelHook>) -> CancelHook {
    Arc::new(move || {
        for hook in &hooks {
            hook();
        }
    })
}

struct Tally<T> {
    remaining: usize,
    slots: Vec<Option<T>>,
}

impl<T> Tally<T> {
    /// Stores `value` at `index` and hands back every value once the last
    /// slot is filled.
    fn record(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        let slot = self.slots.get_mut(index)?;
        if slot.replace(value).is_none() {
            self.remaining -= 1;
        }
        if self.remaining == 0 {
            self.slots.drain(..).collect()
        } else {
            None
        }
    }
}

impl<T> Future<T>
where
    T: Clone + Send + 'static,
{
    /// Resolves to every value, in the order of `futures`, or to the first
    /// error. An empty input resolves immediately to an empty vector.
    ///
    /// ```
    /// use promise_chain::{Future, Promise};
    ///
    /// let (first, second) = (Promise::<i32>::new(), Promise::<i32>::new());
    /// let all = Future::combine([first.proxy(), second.proxy()]);
    /// second.fulfill(2);
    /// first.fulfill(1);
    /// assert_eq!(all.wait().unwrap(), vec![1, 2]);
    /// ```
    pub fn combine<I>(futures: I) -> Future<Vec<T>>
    where
        I: IntoIterator<Item = Future<T>>,
    {
        let sources: Vec<Future<T>> = futures.into_iter().collect();
        let cancel = cancel_all(sources.iter().map(Future::cancel_hook).collect());
        let promise = Promise::new();
        if sources.is_empty() {
            promise.fulfill(Vec::new());
            return Future::derived(promise.core(), cancel);
        }

        let tally = Arc::new(Mutex::new(Tally {
            remaining: sources.len(),
            slots: (0..sources.len()).map(|_| None).collect(),
        }));
        for (index, source) in sources.iter().enumerate() {
            let tally = tally.clone();
            let sink = promise.clone();
            source.submit(move |outcome| match outcome {
                Ok(value) => {
                    let done = tally.lock().record(index, value);
                    if let Some(values) = done {
                        sink.fulfill(values);
                    }
                }
                Err(error) => sink.reject(error),
            });
        }
        Future::derived(promise.core(), cancel)
    }

    /// Combines this future with `others`, this one first.
    pub fn combined_with<I>(&self, others: I) -> Future<Vec<T>>
    where
        I: IntoIterator<Item = Future<T>>,
    {
        Future::combine(iter::once(self.clone()).chain(others))
    }

    /// Pairs this value with `other`'s. See [`zip`].
    pub fn zip<U>(&self, other: &Future<U>) -> Future<(T, U)>
    where
        U: Clone + Send + 'static,
    {
        zip(self, other)
    }

    /// Adopts whichever result arrives first among this future and
    /// `others`, success or failure. Later results are ignored.
    pub fn racing<I>(&self, others: I) -> Future<T>
    where
        I: IntoIterator<Item = Future<T>>,
    {
        let participants: Vec<Future<T>> = iter::once(self.clone()).chain(others).collect();
        let cancel = cancel_all(participants.iter().map(Future::cancel_hook).collect());
        let promise = Promise::new();
        for participant in &participants {
            let sink = promise.clone();
            participant.submit(move |outcome| sink.settle(outcome));
        }
        Future::derived(promise.core(), cancel)
    }
}

/// Resolves to both values once both sources succeed, or to the first error.
/// Cancelling the pair cancels both sources.
pub fn zip<A, B>(first: &Future<A>, second: &Future<B>) -> Future<(A, B)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    let cancel = cancel_all(vec![first.cancel_hook(), second.cancel_hook()]);
    let promise = Promise::new();
    let pair: Arc<Mutex<(Option<A>, Option<B>)>> = Arc::new(Mutex::new((None, None)));

    let (left, sink) = (pair.clone(), promise.clone());
    first.submit(move |outcome| match outcome {
        Ok(a) => {
            let done = {
                let mut pair = left.lock();
                pair.0 = Some(a);
                match &*pair {
                    (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                    _ => None,
                }
            };
            if let Some(both) = done {
                sink.fulfill(both);
            }
        }
        Err(error) => sink.reject(error),
    });

    let (right, sink) = (pair, promise.clone());
    second.submit(move |outcome| match outcome {
        Ok(b) => {
            let done = {
                let mut pair = right.lock();
                pair.1 = Some(b);
                match &*pair {
                    (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                    _ => None,
                }
            };
            if let Some(both) = done {
                sink.fulfill(both);
            }
        }
        Err(error) => sink.reject(error),
    });

    Future::derived(promise.core(), cancel)
}
