//! Cancellation signals — cooperative cancellation for registered work.
//!
//! `CancellationSignal` is the caller-created half: fire it once, observe it
//! from as many clones as needed. The executor never creates these on the
//! caller's behalf; it only consumes them. `LinkedCancellation` is the fan-in
//! the worker loop hands to one invocation of work: it fires when either the
//! executor-wide signal or the item's own signal fires, and reports which.

use tokio::sync::watch;

use crate::error::CancelSource;

/// A cooperative cancellation signal.
///
/// Wraps a `tokio::sync::watch` channel. Clone-friendly — the caller keeps
/// one copy to fire, the executor holds another for the pending item.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// Create a new (not-yet-fired) signal.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Fire the signal. Idempotent — multiple calls are safe.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Check whether the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal fires.
    ///
    /// Returns immediately if it already has.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        loop {
            if rx.changed().await.is_err() {
                // Sender gone - treat as fired so waiters never hang
                return;
            }
            if *rx.borrow() {
                return;
            }
        }
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// The fan-in of the executor-wide signal and one item's own signal.
///
/// Handed to the work closure for a single invocation. Fires when either
/// parent fires; `cancelled()` resolves to the parent that fired, with the
/// executor-wide signal winning ties.
#[derive(Debug, Clone)]
pub struct LinkedCancellation {
    executor: CancellationSignal,
    task: Option<CancellationSignal>,
}

impl LinkedCancellation {
    pub(crate) fn new(executor: CancellationSignal, task: Option<CancellationSignal>) -> Self {
        Self { executor, task }
    }

    /// Check whether either parent signal has fired.
    pub fn is_cancelled(&self) -> bool {
        self.executor.is_cancelled() || self.task.as_ref().is_some_and(|s| s.is_cancelled())
    }

    /// Wait until either parent fires and report which one.
    pub async fn cancelled(&self) -> CancelSource {
        tokio::select! {
            biased;
            _ = self.executor.cancelled() => CancelSource::Executor,
            _ = task_cancelled(self.task.as_ref()) => CancelSource::Task,
        }
    }
}

/// Resolves when the item's own signal fires; pends forever for items
/// registered without one.
pub(crate) async fn task_cancelled(signal: Option<&CancellationSignal>) {
    match signal {
        Some(signal) => signal.cancelled().await,
        None => std::future::pending().await,
    }
}
