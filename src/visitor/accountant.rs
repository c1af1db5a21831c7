//! Work accounting for a single glob query
//!
//! Every task is bracketed by an increment of the pending counter before it
//! is enqueued and a decrement in an epilogue that runs on all exit paths,
//! including panics. The decrement that brings the counter back to zero
//! fires the completion channel, exactly once.
//!
//! Failures are aggregated into one slot per severity class so that a minor
//! I/O error racing ahead of a panic can never mask it. The first report
//! per class wins; later task bodies short-circuit but still run their
//! bookkeeping.

use crate::error::GlobError;
use crate::executor::{Executor, Task};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The single message a query's completion channel ever carries.
///
/// A successful query sends `Finished`; the waiter then snapshots the
/// result set, which is safe because no task runs after the pending count
/// reaches zero.
#[derive(Debug)]
pub(crate) enum Completion {
    Finished,
    Failed(GlobError),
    Canceled,
}

/// Counters, error slots, and completion signaling for one query.
pub(crate) struct WorkAccountant {
    pending_ops: AtomicU64,
    total_ops: AtomicU64,

    /// Cheap flag mirroring "any error slot is populated"
    failed: AtomicBool,

    // Severity slots, most serious first. io::Error is not Clone, so each
    // slot is a guarded Option with first-writer-wins semantics.
    engine_fault: Mutex<Option<String>>,
    task_panic: Mutex<Option<String>>,
    io_failure: Mutex<Option<io::Error>>,

    canceled: AtomicBool,
    done_tx: Sender<Completion>,
    executor: Option<Arc<dyn Executor>>,
}

impl WorkAccountant {
    /// Create the accountant and the receiving half of its completion
    /// channel. `executor` of `None` runs every task inline on the thread
    /// that enqueues it.
    pub(crate) fn new(
        executor: Option<Arc<dyn Executor>>,
    ) -> (Arc<Self>, Receiver<Completion>) {
        let (done_tx, done_rx) = bounded(1);
        let accountant = Arc::new(Self {
            pending_ops: AtomicU64::new(0),
            total_ops: AtomicU64::new(0),
            failed: AtomicBool::new(false),
            engine_fault: Mutex::new(None),
            task_panic: Mutex::new(None),
            io_failure: Mutex::new(None),
            canceled: AtomicBool::new(false),
            done_tx,
            executor,
        });
        (accountant, done_rx)
    }

    /// Wrap `body` with the skip check and the bookkeeping epilogue, then
    /// hand it to the executor (or run it inline).
    pub(crate) fn enqueue(self: &Arc<Self>, body: Task) {
        self.total_ops.fetch_add(1, Ordering::Relaxed);
        self.pending_ops.fetch_add(1, Ordering::SeqCst);

        let accountant = Arc::clone(self);
        let wrapped = move || {
            if !accountant.canceled.load(Ordering::SeqCst)
                && !accountant.failed.load(Ordering::SeqCst)
            {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(body)) {
                    accountant.record_panic(payload);
                }
            }
            accountant.decrement_and_check_done();
        };

        match &self.executor {
            Some(executor) => executor.execute(Box::new(wrapped)),
            None => wrapped(),
        }
    }

    /// Raise the pending count without enqueueing a task. Brackets the root
    /// dispatch loop so completion cannot fire before every per-pattern
    /// root is queued; paired with [`finish_dispatch`].
    ///
    /// [`finish_dispatch`]: Self::finish_dispatch
    pub(crate) fn begin_dispatch(&self) {
        self.pending_ops.fetch_add(1, Ordering::SeqCst);
    }

    /// Release the dispatch bracket taken by [`begin_dispatch`].
    ///
    /// [`begin_dispatch`]: Self::begin_dispatch
    pub(crate) fn finish_dispatch(&self) {
        self.decrement_and_check_done();
    }

    /// Request cancellation. Best-effort: in-flight tasks finish their
    /// bookkeeping but skip their bodies, and completion reports canceled.
    pub(crate) fn cancel(&self) {
        debug!("glob query canceled");
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Record an I/O failure from a task body. First writer wins.
    pub(crate) fn record_io(&self, err: io::Error) {
        warn!("glob traversal error: {}", err);
        let mut slot = self.io_failure.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
        self.failed.store(true, Ordering::SeqCst);
    }

    /// Record a panic captured from a task body. First writer wins.
    fn record_panic(&self, payload: Box<dyn Any + Send>) {
        let message = panic_message(payload.as_ref());
        warn!("glob task panicked: {}", message);
        let mut slot = self.task_panic.lock();
        if slot.is_none() {
            *slot = Some(message);
        }
        self.failed.store(true, Ordering::SeqCst);
    }

    /// Take the most serious recorded failure, if any.
    fn take_most_serious(&self) -> Option<GlobError> {
        if let Some(message) = self.engine_fault.lock().take() {
            return Some(GlobError::Engine(message));
        }
        if let Some(message) = self.task_panic.lock().take() {
            return Some(GlobError::TaskPanic(message));
        }
        if let Some(err) = self.io_failure.lock().take() {
            return Some(GlobError::Io(err));
        }
        None
    }

    fn decrement_and_check_done(&self) {
        if self.pending_ops.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Zero is reached exactly when all relevant work is done: the
            // count goes up before each enqueue and only comes down here,
            // after any tasks the body itself enqueued were counted.
            let completion = if self.canceled.load(Ordering::SeqCst) {
                Completion::Canceled
            } else if let Some(err) = self.take_most_serious() {
                Completion::Failed(err)
            } else {
                Completion::Finished
            };
            debug!(
                "glob query complete after {} tasks",
                self.total_ops.load(Ordering::Relaxed)
            );
            // A disconnected receiver means the handle was dropped without
            // waiting; there is nobody left to notify.
            let _ = self.done_tx.send(completion);
        }
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
