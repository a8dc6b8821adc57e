//! The scheduling capability the combinators consume.
//!
//! The crate never runs a pool of its own. [`dispatch`](crate::Future::dispatch),
//! [`delay`](crate::delay) and [`timeout`](crate::timeout) only need something
//! that accepts a job now or after a delay. [`ThreadExecutor`] and
//! [`SerialExecutor`] are minimal adapters over `std::thread` for callers
//! without a runtime of their own.
use parking_lot::Mutex;
use std::{
    fmt,
    sync::mpsc::{channel, Sender},
    thread,
    time::Duration,
};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait Executor: Send + Sync {
    /// Runs `job` eventually, possibly on another thread.
    fn schedule(&self, job: Job);

    /// Runs `job` no earlier than `delay` from now.
    fn schedule_after(&self, delay: Duration, job: Job);
}

fn spawn_named(name: &str, job: Job) {
    if let Err(error) = thread::Builder::new().name(name.to_owned()).spawn(job) {
        tracing::error!(%error, thread = name, "failed to spawn thread, dropping job");
    }
}

/// Runs every job on a fresh thread.
#[derive(Debug, Clone)]
pub struct ThreadExecutor {
    name: String,
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::named("promise-chain")
    }
}

impl ThreadExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the spawned threads `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Executor for ThreadExecutor {
    fn schedule(&self, job: Job) {
        spawn_named(&self.name, job);
    }

    fn schedule_after(&self, delay: Duration, job: Job) {
        spawn_named(
            &self.name,
            Box::new(move || {
                thread::sleep(delay);
                job();
            }),
        );
    }
}

/// Runs jobs one at a time, in submission order, on a single worker thread.
///
/// The worker exits once the executor and every pending delayed job are gone.
pub struct SerialExecutor {
    name: String,
    sender: Mutex<Sender<Job>>,
}

impl fmt::Debug for SerialExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialExecutor").field("name", &self.name).finish()
    }
}

impl SerialExecutor {
    pub fn new(name: impl Into<String>) -> std::io::Result<Self> {
        let name = name.into();
        let (sender, receiver) = channel::<Job>();
        thread::Builder::new().name(name.clone()).spawn(move || {
            for job in receiver {
                job();
            }
        })?;
        Ok(Self {
            name,
            sender: Mutex::new(sender),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn sender(&self) -> Sender<Job> {
        self.sender.lock().clone()
    }
}

impl Executor for SerialExecutor {
    fn schedule(&self, job: Job) {
        if self.sender().send(job).is_err() {
            tracing::error!(executor = %self.name, "serial worker has stopped, dropping job");
        }
    }

    fn schedule_after(&self, delay: Duration, job: Job) {
        let sender = self.sender();
        let name = self.name.clone();
        spawn_named(
            &format!("{name}-timer"),
            Box::new(move || {
                thread::sleep(delay);
                if sender.send(job).is_err() {
                    tracing::error!(executor = %name, "serial worker has stopped, dropping job");
                }
            }),
        );
    }
}
