//! Error types for vkr-sched.

use thiserror::Error;

/// Failures a scheduler can report back to a caller.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `RunLoop::push` was called after `finish()`. The pushed operation
    /// is completed with `set_stopped` before this error is returned, so
    /// the caller never has to pick the completion up itself.
    #[error("run loop is no longer accepting work")]
    Closed,
}

/// Result alias for vkr-sched operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
