//! Foundational, leaf-level machinery for the `vkr` execution core:
//! tag dispatch, compile-time type lists, and stop tokens.
//!
//! Nothing in this crate knows about senders, receivers, or schedulers —
//! those live in `vkr-env` and `vkr-exec`, which are built on top of this
//! one.

pub mod dispatch;
pub mod stop_token;
pub mod typelist;

pub use dispatch::{Dispatch, Tag};
pub use stop_token::{NeverStopToken, StopCallback, StopSource, StopToken, StoppableToken};
pub use typelist::{Apply, Concat, Cons, Contains, Here, Nil, There, TypeList};
