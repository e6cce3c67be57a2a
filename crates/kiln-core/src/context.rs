//! The serialized execution context.
//!
//! Rebuilds must run on a single serialized worker, never on the thread
//! that observed a filesystem event. `MainContext` is that worker: a
//! dedicated loop draining a FIFO queue of one-shot tasks. Handles are
//! cheap to clone and may enqueue from any thread; tasks run one at a
//! time, in the order they were scheduled.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::debug;

/// A one-shot unit of work for the context.
type Task = Box<dyn FnOnce() + Send + 'static>;

/// Enqueue side of the context.
///
/// Clones share the same queue. The context loop keeps running as long as
/// at least one handle is alive.
#[derive(Clone)]
pub struct MainContextHandle {
    tx: Sender<Task>,
}

impl MainContextHandle {
    /// Schedules a task to run on the context as soon as possible.
    ///
    /// Returns `false` if the context has already shut down, in which case
    /// the task is dropped.
    pub fn schedule<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(task)).is_ok()
    }
}

/// A single-threaded FIFO task loop.
///
/// Tasks are one-shot: each runs once and is gone, so nothing queued here
/// can fire a second time on its own.
pub struct MainContext {
    rx: Receiver<Task>,
    handle: MainContextHandle,
}

impl MainContext {
    /// Creates a context whose loop has not started yet. Call [`run`] to
    /// drive it on the current thread, or use [`spawn`] for a dedicated
    /// thread.
    ///
    /// [`run`]: MainContext::run
    /// [`spawn`]: MainContext::spawn
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            rx,
            handle: MainContextHandle { tx },
        }
    }

    /// A fresh handle for scheduling onto this context.
    pub fn handle(&self) -> MainContextHandle {
        self.handle.clone()
    }

    /// Runs the task loop on the current thread until every handle has
    /// been dropped.
    pub fn run(self) {
        let MainContext { rx, handle } = self;
        // Drop the context's own handle, otherwise the loop never sees
        // the channel close.
        drop(handle);

        while let Ok(task) = rx.recv() {
            task();
        }

        debug!("execution context drained, shutting down");
    }

    /// Starts the task loop on a dedicated thread and returns a handle to
    /// it. The thread exits once every handle has been dropped.
    pub fn spawn() -> MainContextHandle {
        let ctx = Self::new();
        let handle = ctx.handle();
        thread::spawn(move || ctx.run());
        handle
    }
}

impl Default for MainContext {
    fn default() -> Self {
        Self::new()
    }
}
