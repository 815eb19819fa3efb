//! Convenience re-exports for typical use.
//!
//! ```rust
//! use taskline::prelude::*;
//! ```

pub use crate::cancellation::{CancellationSignal, LinkedCancellation};
pub use crate::completion::TaskHandle;
pub use crate::error::{BoxError, CancelSource, ExecutorError, TaskError};
pub use crate::executor::SequentialExecutor;
pub use crate::lifecycle::Lifecycle;
