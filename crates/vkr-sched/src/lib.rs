//! Schedulers for the `vkr` execution core: an inline scheduler, a
//! blocking run-loop queue, and a fixed-size thread pool built on top of
//! it, plus the `get_scheduler`/`get_delegatee_scheduler` environment
//! queries.

pub mod err;
pub mod inline;
pub mod queries;
pub mod run_loop;
pub mod thread_run_loop;

pub use err::{Result, SchedulerError};
pub use inline::{InlineScheduler, InlineSender};
pub use queries::{
    get_scheduler_sender, GetDelegateeScheduler, GetDelegateeSchedulerTag, GetScheduler,
    GetSchedulerQuery, GetSchedulerTag,
};
pub use run_loop::{QueuedOp, RunLoop, RunLoopSender};
pub use thread_run_loop::ThreadRunLoop;
