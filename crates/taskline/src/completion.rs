//! Completion plumbing — single-assignment delivery of one item's outcome.
//!
//! `Completer` is the worker-side half: exactly one of its delivery methods
//! takes effect per item, all later calls are silent no-ops. `TaskHandle` is
//! the caller-side future returned by registration.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::oneshot;

use crate::cancellation::{CancellationSignal, task_cancelled};
use crate::error::{BoxError, CancelSource, TaskError};

/// Worker-side completion handle for one work item.
///
/// The underlying oneshot sender is consumed by the first delivery, so only
/// the first of `complete`/`cancel`/`fail`/`panicked` wins.
pub(crate) struct Completer<T> {
    tx: Option<oneshot::Sender<Result<T, TaskError>>>,
}

impl<T> Completer<T> {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Result<T, TaskError>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub(crate) fn complete(&mut self, value: T) {
        self.deliver(Ok(value));
    }

    pub(crate) fn cancel(&mut self, source: CancelSource) {
        self.deliver(Err(TaskError::Cancelled(source)));
    }

    pub(crate) fn fail(&mut self, error: BoxError) {
        self.deliver(Err(TaskError::Failed(error)));
    }

    pub(crate) fn panicked(&mut self, message: String) {
        self.deliver(Err(TaskError::Panicked(message)));
    }

    fn deliver(&mut self, outcome: Result<T, TaskError>) {
        if let Some(tx) = self.tx.take() {
            // The caller may have stopped waiting; nothing to do then.
            let _ = tx.send(outcome);
        }
    }
}

/// Awaitable handle for one registered work item.
///
/// Resolves to `Ok(value)` on success, or to a [`TaskError`] describing
/// cancellation, failure, or a contained panic. While no outcome has been
/// delivered yet, the handle also observes the item's own cancellation signal
/// and the executor-wide one, so a cancellation that fires before the worker
/// reaches the item resolves the awaiting caller immediately, independent of
/// queue position. A delivered outcome is checked first on every poll and
/// therefore always wins once present.
#[must_use = "a task handle does nothing unless awaited"]
pub struct TaskHandle<T> {
    inner: BoxFuture<'static, Result<T, TaskError>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    pub(crate) fn new(
        outcome: oneshot::Receiver<Result<T, TaskError>>,
        cancel: Option<CancellationSignal>,
        shutdown: CancellationSignal,
    ) -> Self {
        let inner = async move {
            let mut outcome = outcome;
            tokio::select! {
                biased;
                delivered = &mut outcome => match delivered {
                    Ok(result) => result,
                    // Worker torn down without resolving this item
                    Err(_) => Err(TaskError::Cancelled(CancelSource::Executor)),
                },
                _ = shutdown.cancelled() => Err(TaskError::Cancelled(CancelSource::Executor)),
                _ = task_cancelled(cancel.as_ref()) => Err(TaskError::Cancelled(CancelSource::Task)),
            }
        }
        .boxed();
        Self { inner }
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle").finish_non_exhaustive()
    }
}
