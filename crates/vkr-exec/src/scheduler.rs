//! The `Scheduler` concept.
//!
//! Defined here, one layer below the concrete schedulers, so that `on`,
//! `transfer`, `schedule_from`, and `transfer_just` can be generic over
//! "anything schedulable" without this crate depending on the inline
//! scheduler or run loop that implement it.

use vkr_env::HasEnv;

use crate::sender::Sender;

/// A scheduling affinity: something `schedule()` turns into a sender whose
/// completion marks having arrived on that execution context.
pub trait Scheduler: HasEnv + Clone + PartialEq {
    /// The sender `schedule` produces. Its value channel carries no
    /// information beyond "you have arrived" — always `()`.
    type Sender: Sender;

    /// Produces a sender that completes once execution has moved onto
    /// this scheduler's context.
    fn schedule(&self) -> Self::Sender;
}
