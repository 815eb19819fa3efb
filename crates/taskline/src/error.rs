//! Error types for the executor API and per-item outcomes.

/// Boxed error type carried by failed work items.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned synchronously by [`SequentialExecutor`] methods.
///
/// [`SequentialExecutor`]: crate::SequentialExecutor
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The executor has been shut down; it no longer accepts work and cannot
    /// be restarted. Calling `register` or `execute` after `shutdown` is a
    /// caller bug, surfaced as an error rather than a panic.
    #[error("executor has been shut down")]
    Shutdown,
}

/// Which cancellation signal fired for a cancelled item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelSource {
    /// The executor-wide signal, fired at shutdown. Affects every item still
    /// pending or in flight at that point.
    Executor,
    /// The item's own signal, supplied by the caller at registration. Affects
    /// only that item.
    Task,
}

impl std::fmt::Display for CancelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelSource::Executor => write!(f, "executor shutdown"),
            CancelSource::Task => write!(f, "task signal"),
        }
    }
}

/// The non-success outcome of one registered work item, delivered through its
/// [`TaskHandle`](crate::TaskHandle).
///
/// Cancellation is a distinct outcome, not a failure: `Cancelled` records
/// which signal fired, `Failed` carries the work's own error untouched, and
/// `Panicked` reports a contained panic (the worker loop survives it).
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task was cancelled by {0}")]
    Cancelled(CancelSource),

    #[error("task failed: {0}")]
    Failed(#[source] BoxError),

    #[error("task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    /// `true` for either cancellation source.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled(_))
    }
}
