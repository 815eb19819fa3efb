//! Executor lifecycle states.
//!
//! ```text
//! Idle -> Running   (execute; idempotent, at most one worker loop)
//! Idle | Running -> Shutdown   (shutdown; idempotent, terminal)
//! ```

/// Lifecycle of a [`SequentialExecutor`](crate::SequentialExecutor).
///
/// `Idle`: queue open, worker not started — registrations buffer.
/// `Running`: queue open, the single worker loop is draining it.
/// `Shutdown`: terminal — queue closed, executor-wide signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Running,
    Shutdown,
}

impl Lifecycle {
    /// `true` once `shutdown()` has run; no further work is accepted and no
    /// transition leaves this state.
    pub fn is_shut_down(self) -> bool {
        matches!(self, Lifecycle::Shutdown)
    }
}
