//! Sender/receiver/operation-state protocol, factories, adaptors, and a
//! receiver-adaptor helper for the `vkr` execution core.
//!
//! Everything here is synchronous: `start` runs an operation to
//! completion (or to the point a scheduler takes over) on the calling
//! thread. Schedulers themselves live one layer up, in `vkr-sched`; this
//! crate only defines the `Scheduler` concept so adaptors can be generic
//! over it.

pub mod adaptors;
pub mod factories;
pub mod pipe;
pub mod receiver_adaptor;
pub mod scheduler;
pub mod sender;
pub mod testing;

pub use adaptors::{
    bulk, into_variant, let_error, let_stopped, let_value, on, schedule_from, stopped_as_error,
    stopped_as_optional, then, transfer, upon_error, upon_stopped, Bulk, FromStopped, IntoVariant,
    LetError, LetStopped, LetValue, SingleVariant, StoppedAsError, StoppedAsOptional,
};
pub use factories::{
    get_stop_token_sender, just, just_error, just_stopped, read, transfer_just, Just, JustError,
    JustStopped, Read,
};
pub use pipe::{AdaptorClosure, Pipe};
pub use receiver_adaptor::{ReceiverAdaptor, ReceiverHooks};
pub use scheduler::Scheduler;
pub use sender::{connect_and_start, Connect, OperationState, Receiver, Sender};
pub use testing::CellReceiver;
