//! Task execution
//!
//! The engine dispatches traversal work to a caller-supplied executor. The
//! contract is deliberately thin: accept a task, run it eventually, on any
//! thread. Correctness never depends on ordering or on the executor
//! draining; completion is tracked by the work accountant's counters.
//!
//! `ThreadPoolExecutor` is the stock implementation: a fixed set of named
//! worker threads draining an unbounded channel. Dropping the pool
//! disconnects the channel and joins the workers after queued tasks finish.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::debug;

/// A unit of traversal work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Accepts tasks for later execution.
///
/// Implementations may run tasks synchronously on the submitting thread, on
/// a single background thread, or on a pool. Tasks enqueue further tasks
/// from within themselves, so an executor must never block a submission on
/// the completion of earlier tasks.
pub trait Executor: Send + Sync {
    fn execute(&self, task: Task);
}

/// Fixed-size thread pool executor.
pub struct ThreadPoolExecutor {
    sender: Option<Sender<Task>>,
    handles: Vec<JoinHandle<()>>,
}

impl ThreadPoolExecutor {
    /// Spawn `workers` threads, each draining the shared task channel.
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let (sender, receiver) = unbounded::<Task>();
        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let receiver: Receiver<Task> = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("glob-worker-{}", id))
                .spawn(move || {
                    debug!("worker {} started", id);
                    while let Ok(task) = receiver.recv() {
                        task();
                    }
                    debug!("worker {} finished", id);
                })
                .expect("failed to spawn glob worker thread");
            handles.push(handle);
        }

        Self {
            sender: Some(sender),
            handles,
        }
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.handles.len()
    }
}

impl Executor for ThreadPoolExecutor {
    fn execute(&self, task: Task) {
        let sender = self
            .sender
            .as_ref()
            .expect("sender only vacated in drop");
        if let Err(err) = sender.send(task) {
            // Every worker has died. Dropping the task would strand the
            // pending-ops counter and hang the query, so run it here.
            debug!("worker pool unavailable, running task inline");
            (err.0)();
        }
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        // Disconnect so workers exit once the queue drains
        self.sender.take();
        let current = thread::current().id();
        for handle in self.handles.drain(..) {
            // The pool can be dropped from inside one of its own tasks when
            // the last shared handle is held by a worker; that thread exits
            // on its own once its task returns and must not join itself.
            if handle.thread().id() == current {
                continue;
            }
            let _ = handle.join();
        }
    }
}
