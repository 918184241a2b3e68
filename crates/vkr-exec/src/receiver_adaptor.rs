//! A receiver adaptor base: override only the completion channels you
//! care about, forward the rest unchanged.
//!
//! Wrapping a receiver to intercept one channel and forward the other two
//! is common enough ([`crate::adaptors`] does it three separate times)
//! that it's worth naming once. `ReceiverHooks` carries default methods
//! that just forward to the wrapped receiver; a caller only needs to
//! override the hook for the channel it's changing.

use vkr_env::HasEnv;

use crate::sender::Receiver;

/// Override points for a [`ReceiverAdaptor`]. Every method defaults to
/// forwarding straight to `base`.
pub trait ReceiverHooks<Base: Receiver>: Sized {
    fn set_value(self, base: Base, value: Base::Value) {
        base.set_value(value);
    }

    fn set_error(self, base: Base, error: Base::Error) {
        base.set_error(error);
    }

    fn set_stopped(self, base: Base) {
        base.set_stopped();
    }
}

/// A receiver formed from a hook type `D` plus a wrapped `base` receiver.
/// `D`'s [`ReceiverHooks`] overrides decide what actually happens on each
/// completion; anything it doesn't override passes straight through.
pub struct ReceiverAdaptor<D, Base> {
    pub hooks: D,
    pub base: Base,
}

impl<D, Base: HasEnv> HasEnv for ReceiverAdaptor<D, Base> {
    type Env = Base::Env;
    fn get_env(&self) -> Base::Env {
        self.base.get_env()
    }
}

impl<D, Base> Receiver for ReceiverAdaptor<D, Base>
where
    D: ReceiverHooks<Base>,
    Base: Receiver,
{
    type Value = Base::Value;
    type Error = Base::Error;

    fn set_value(self, value: Base::Value) {
        self.hooks.set_value(self.base, value);
    }

    fn set_error(self, error: Base::Error) {
        self.hooks.set_error(self.base, error);
    }

    fn set_stopped(self) {
        self.hooks.set_stopped(self.base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factories::just;
    use crate::sender::{Connect, OperationState};
    use crate::testing::CellReceiver;
    use vkr_env::Never;

    struct DoubleOnValue;

    impl ReceiverHooks<CellReceiver<i32, Never>> for DoubleOnValue {
        fn set_value(self, base: CellReceiver<i32, Never>, value: i32) {
            base.set_value(value * 2);
        }
    }

    #[test]
    fn unoverridden_hooks_forward_untouched() {
        let cell = CellReceiver::<i32, Never>::new();
        let adaptor = ReceiverAdaptor {
            hooks: DoubleOnValue,
            base: cell.clone(),
        };
        just(21).connect(adaptor).start();
        assert_eq!(cell.take_value(), Some(42));
    }
}
