//! Pipeable partial application for sender adaptors.
//!
//! Every adaptor in [`crate::adaptors`] takes its source sender as the
//! first argument (`then(source, f)`, `let_value(source, f)`, ...). Rust
//! has no `|>` operator, but it does let a local type implement
//! `std::ops::BitOr`, so `sender | adaptor_closure(|s| then(s, f))` reads
//! left-to-right the way a pipe chain should. `AdaptorClosure` is the
//! generic wrapper that makes any `FnOnce(S) -> Out` usable that way —
//! there's no need for a hand-written closure type per adaptor.

use std::ops::BitOr;

/// Wraps a closure so it can be applied with [`Pipe::pipe`] or `|`.
pub struct AdaptorClosure<F>(F);

/// Builds an [`AdaptorClosure`] from `f`.
pub fn adaptor_closure<S, Out, F: FnOnce(S) -> Out>(f: F) -> AdaptorClosure<F> {
    AdaptorClosure(f)
}

/// `sender.pipe(adaptor_closure(...))`, the method-call spelling of `|`.
pub trait Pipe<A> {
    type Output;
    fn pipe(self, adaptor: A) -> Self::Output;
}

impl<S, F, Out> Pipe<AdaptorClosure<F>> for S
where
    F: FnOnce(S) -> Out,
{
    type Output = Out;

    fn pipe(self, adaptor: AdaptorClosure<F>) -> Out {
        (adaptor.0)(self)
    }
}

impl<S, F, Out> BitOr<AdaptorClosure<F>> for S
where
    F: FnOnce(S) -> Out,
{
    type Output = Out;

    fn bitor(self, adaptor: AdaptorClosure<F>) -> Out {
        (adaptor.0)(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factories::just;
    use crate::sender::{Connect, OperationState};
    use crate::testing::CellReceiver;

    #[test]
    fn pipe_applies_an_adaptor_closure() {
        let doubled = just(21) | adaptor_closure(|s| crate::adaptors::then(s, |v: i32| v * 2));
        let cell = CellReceiver::new();
        doubled.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(42));
    }
}
