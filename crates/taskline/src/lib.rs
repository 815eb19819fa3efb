//! # Taskline
//!
//! **Single-consumer sequential task executor.**
//!
//! Producers on any number of tasks or threads register async work items; the
//! executor guarantees they run one at a time, in exactly the order they were
//! registered, on a single dedicated worker loop. Use it to serialize access
//! to a resource — a network endpoint, a device, a shared mutable store —
//! without writing your own locking or queueing, while keeping an
//! individually awaitable result and independent cancellation per item.
//!
//! ## Quick Start
//!
//! ```rust
//! use taskline::SequentialExecutor;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = SequentialExecutor::<u32>::new();
//! executor.execute()?;
//!
//! // Registration returns immediately; the worker runs items in order.
//! let doubled = executor.register_with(|n, _cancel| async move { Ok(n * 2) }, 21, None)?;
//! let answer = executor.register(|_cancel| async { Ok(12) }, None)?;
//!
//! assert_eq!(doubled.await?, 42);
//! assert_eq!(answer.await?, 12);
//!
//! executor.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! Work may also be registered *before* `execute()`: items buffer in the
//! queue and run once the worker starts. That deferred-start behavior is part
//! of the contract, not an accident of implementation.
//!
//! ## Architecture
//!
//! - [`SequentialExecutor`]: the lifecycle gate (`idle -> running ->
//!   shutdown`), the unbounded FIFO queue, and the single worker loop
//! - [`TaskHandle`]: per-item awaitable, resolved exactly once with success,
//!   cancellation, failure, or a contained panic
//! - [`CancellationSignal`] / [`LinkedCancellation`]: caller-owned per-item
//!   cancellation, and the fan-in with the executor-wide signal that one
//!   invocation of work observes
//! - [`TaskError`] / [`CancelSource`]: the outcome taxonomy — cancellation is
//!   distinct from failure and records which signal fired

// Core modules
pub mod cancellation;
pub mod completion;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod prelude;

// Re-exports for convenience
pub use cancellation::{CancellationSignal, LinkedCancellation};
pub use completion::TaskHandle;
pub use error::{BoxError, CancelSource, ExecutorError, TaskError};
pub use executor::SequentialExecutor;
pub use lifecycle::Lifecycle;
