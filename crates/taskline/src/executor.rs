//! The sequential executor — FIFO queue, single worker loop, lifecycle gate.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

use crate::cancellation::{CancellationSignal, LinkedCancellation};
use crate::completion::{Completer, TaskHandle};
use crate::error::{BoxError, CancelSource, ExecutorError};
use crate::lifecycle::Lifecycle;

/// Boxed async work unit — the actual operation to execute for one item.
type BoxedWork<T> =
    Box<dyn FnOnce(LinkedCancellation) -> BoxFuture<'static, Result<T, BoxError>> + Send>;

/// One registered unit of work plus its completion and cancellation state.
/// Created at registration, consumed exactly once by the worker loop.
struct WorkItem<T> {
    seq: u64,
    work: BoxedWork<T>,
    completer: Completer<T>,
    cancel: Option<CancellationSignal>,
}

/// Mutable state behind the lifecycle gate. The queue receiver lives here
/// until `execute()` moves it into the worker loop.
struct Gate<T> {
    lifecycle: Lifecycle,
    queue_tx: Option<UnboundedSender<WorkItem<T>>>,
    queue_rx: Option<UnboundedReceiver<WorkItem<T>>>,
}

/// A single-consumer sequential task executor.
///
/// Any number of producers may register async work items concurrently; the
/// executor runs them one at a time, in exactly the order they were
/// registered, on a single spawned worker loop. Each registration returns a
/// [`TaskHandle`] that resolves to that item's own outcome and can be
/// cancelled independently of the rest of the queue.
///
/// `T` is the value each item produces; the default `T = ()` covers work
/// that produces nothing. All methods take `&self` and never block, so the
/// executor can be shared across tasks and threads behind an `Arc`.
pub struct SequentialExecutor<T = ()> {
    gate: Mutex<Gate<T>>,
    shutdown: CancellationSignal,
    next_seq: AtomicU64,
}

impl<T> SequentialExecutor<T> {
    /// Create an executor with an open queue and no worker running.
    ///
    /// Work can be registered right away; it buffers until [`execute`] starts
    /// the worker loop.
    ///
    /// [`execute`]: SequentialExecutor::execute
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            gate: Mutex::new(Gate {
                lifecycle: Lifecycle::Idle,
                queue_tx: Some(queue_tx),
                queue_rx: Some(queue_rx),
            }),
            shutdown: CancellationSignal::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Tear the executor down. Idempotent.
    ///
    /// Closes the queue, fires the executor-wide cancellation signal, and
    /// marks the executor shut down. The in-flight item and everything still
    /// queued resolve as cancelled; `register` and `execute` return
    /// [`ExecutorError::Shutdown`] from here on. Does not wait for the worker
    /// loop to finish unwinding — no new work starts after this returns, but
    /// the loop may still be delivering cancellations for a moment.
    ///
    /// Dropping the executor calls this implicitly.
    pub fn shutdown(&self) {
        let mut gate = self.gate.lock();
        if gate.lifecycle.is_shut_down() {
            return;
        }
        gate.lifecycle = Lifecycle::Shutdown;
        // Close the queue and fire the signal under the gate so no
        // registration can interleave with teardown.
        gate.queue_tx = None;
        // If the worker never started, the buffered items are dropped here;
        // their handles resolve through the executor-wide signal.
        gate.queue_rx = None;
        self.shutdown.cancel();
        debug!("executor shut down");
    }
}

impl<T: Send + 'static> SequentialExecutor<T> {
    /// Start the worker loop. Idempotent; never blocks.
    ///
    /// The first call transitions the executor to running and spawns the
    /// single worker loop onto the current Tokio runtime; later calls are
    /// no-ops. Returns [`ExecutorError::Shutdown`] if the executor has
    /// already been shut down.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, as it spawns the worker.
    pub fn execute(&self) -> Result<(), ExecutorError> {
        let mut gate = self.gate.lock();
        match gate.lifecycle {
            Lifecycle::Shutdown => Err(ExecutorError::Shutdown),
            Lifecycle::Running => Ok(()),
            Lifecycle::Idle => {
                gate.lifecycle = Lifecycle::Running;
                if let Some(queue) = gate.queue_rx.take() {
                    debug!("worker loop started");
                    tokio::spawn(worker_loop(queue, self.shutdown.clone()));
                }
                Ok(())
            }
        }
    }

    /// Register a work item and return its awaitable handle. Never blocks.
    ///
    /// Items run strictly in registration order, one at a time. Registering
    /// before [`execute`] is part of the contract: items buffer and run once
    /// the worker starts.
    ///
    /// `cancel`, when supplied, cancels this item alone: if it fires before
    /// the item is reached the work never runs and the handle resolves as
    /// cancelled immediately, independent of queue position; if it fires
    /// mid-run the work future is dropped. The work closure receives the
    /// [`LinkedCancellation`] combining this signal with the executor-wide
    /// one, for cooperative early exit.
    ///
    /// [`execute`]: SequentialExecutor::execute
    pub fn register<F, Fut>(
        &self,
        work: F,
        cancel: Option<CancellationSignal>,
    ) -> Result<TaskHandle<T>, ExecutorError>
    where
        F: FnOnce(LinkedCancellation) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        let gate = self.gate.lock();
        if gate.lifecycle.is_shut_down() {
            return Err(ExecutorError::Shutdown);
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (completer, outcome) = Completer::channel();
        let item = WorkItem {
            seq,
            work: Box::new(move |link| work(link).boxed()),
            completer,
            cancel: cancel.clone(),
        };
        if let Some(queue_tx) = gate.queue_tx.as_ref() {
            let _ = queue_tx.send(item);
        }
        trace!(task = seq, "task registered");
        Ok(TaskHandle::new(outcome, cancel, self.shutdown.clone()))
    }

    /// Register a work function bound to an auxiliary value.
    ///
    /// Lets one work function be reused across registrations, parameterized
    /// per call, instead of each call site building a capturing closure.
    pub fn register_with<V, F, Fut>(
        &self,
        work: F,
        value: V,
        cancel: Option<CancellationSignal>,
    ) -> Result<TaskHandle<T>, ExecutorError>
    where
        V: Send + 'static,
        F: FnOnce(V, LinkedCancellation) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        self.register(move |link| work(value, link), cancel)
    }
}

impl<T> Default for SequentialExecutor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for SequentialExecutor<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The single consumer: drains the queue in enqueue order, one item at a
/// time, until the queue is closed and empty. An item's failure never stops
/// the loop; only shutdown or exhaustion ends it.
async fn worker_loop<T: Send + 'static>(
    mut queue: UnboundedReceiver<WorkItem<T>>,
    shutdown: CancellationSignal,
) {
    while let Some(item) = queue.recv().await {
        let WorkItem {
            seq,
            work,
            mut completer,
            cancel,
        } = item;

        if shutdown.is_cancelled() {
            // Teardown: drain whatever is left as cancellations.
            completer.cancel(CancelSource::Executor);
            continue;
        }
        if cancel.as_ref().is_some_and(|s| s.is_cancelled()) {
            // Fired before the item was reached; the work never runs.
            completer.cancel(CancelSource::Task);
            continue;
        }

        let link = LinkedCancellation::new(shutdown.clone(), cancel);
        trace!(task = seq, "task started");
        // The closure is invoked inside the caught future so a panic while
        // building the work future is contained the same way as one while
        // polling it.
        let work_link = link.clone();
        let run = AssertUnwindSafe(async move { work(work_link).await }).catch_unwind();
        tokio::select! {
            biased;
            source = link.cancelled() => {
                completer.cancel(source);
                debug!(task = seq, %source, "task cancelled in flight");
            }
            outcome = run => match outcome {
                Ok(Ok(value)) => {
                    completer.complete(value);
                    trace!(task = seq, "task completed");
                }
                Ok(Err(error)) => {
                    completer.fail(error);
                    debug!(task = seq, "task failed");
                }
                Err(panic) => {
                    completer.panicked(panic_message(panic));
                    debug!(task = seq, "task panicked");
                }
            },
        }
    }
    debug!("worker loop drained and stopped");
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
