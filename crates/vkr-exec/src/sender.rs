//! The sender/receiver/operation-state protocol.
//!
//! A sender describes work that hasn't started; connecting it to a receiver
//! produces an operation state; starting the operation state runs the work
//! and eventually calls exactly one of the receiver's three completion
//! methods. Nothing here is async — `start` runs to completion (or to the
//! point a scheduler takes over) on the calling thread, the same way a
//! synchronous iterator's `next` does.

use vkr_env::{CompletionSignaturesLike, HasEnv};

/// The three ways an operation can finish.
pub trait Receiver: HasEnv + Sized {
    /// The payload `set_value` carries.
    type Value;
    /// The payload `set_error` carries.
    type Error;

    /// The operation produced a value. Consumes the receiver.
    fn set_value(self, value: Self::Value);
    /// The operation failed. Consumes the receiver.
    fn set_error(self, error: Self::Error);
    /// The operation was cancelled before producing a result. Consumes the
    /// receiver.
    fn set_stopped(self);
}

/// Describes asynchronous (here: not-yet-started) work without performing
/// any of it. `connect`ing a sender to a receiver is the only way to run it.
pub trait Sender: HasEnv {
    /// What this sender can complete with.
    type Sigs: CompletionSignaturesLike;
}

/// An operation produced by connecting a sender to a receiver. `start` is
/// the only operation; everything else about running the work is a side
/// effect of calling it.
///
/// The protocol this models forbids moving an operation state once
/// started, because a continuation elsewhere might hold a pointer into it.
/// Nothing in this workspace ever takes such a pointer — every operation
/// is built, started, and dropped on one call stack, or handed whole to a
/// scheduler's queue where it lives behind a `Box` and so never moves
/// again either — so `start` consumes `self` by value instead of
/// threading `Pin<&mut Self>` through every combinator for no matching
/// safety benefit.
pub trait OperationState {
    /// Runs the operation to completion (or hands it to a scheduler).
    fn start(self);
}

/// Connects `sender` to `receiver` and starts it immediately. The common
/// case: build an operation, run it once, discard it.
pub fn connect_and_start<S, R>(sender: S, receiver: R)
where
    S: Connect<R>,
    R: Receiver,
{
    sender.connect(receiver).start();
}

/// `connect(sender, receiver)`: the one customization point every sender
/// type must implement once per receiver type it accepts.
pub trait Connect<R: Receiver>: Sender {
    /// The operation state this connection produces.
    type Op: OperationState;

    /// Connects `self` to `receiver`, producing a not-yet-started operation.
    fn connect(self, receiver: R) -> Self::Op;
}
