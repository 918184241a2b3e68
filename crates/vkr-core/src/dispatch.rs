//! The tag-dispatch extension point.
//!
//! Every customization point object (CPO) in the `vkr` workspace — `connect`,
//! `start`, `set_value`, `schedule`, `get_env`, and so on — is built on the
//! same primitive: a zero-sized *tag* type identifies the operation, and the
//! argument types (the sender, the receiver, …) pick which implementation
//! runs. Rust has no argument-dependent lookup, but ordinary trait-impl
//! resolution plays the identical role, so `Dispatch` is just a trait with a
//! tag type parameter and a default fallback the tag itself can supply.

/// A customization-point tag. Implementors are zero-sized marker types, one
/// per CPO (`ConnectTag`, `StartTag`, `SetValueTag`, …).
pub trait Tag: Copy + 'static {}

/// Resolves `tag(args)` for a receiving type `Self`.
///
/// A blanket `impl<T: Tag, Args> Dispatch<T, Args> for Unhandled` does not
/// exist on purpose: a missing customization is just a missing trait bound,
/// which already fails to compile with a clear "trait not implemented"
/// diagnostic. Per-CPO default lowering (e.g. `get_env` defaulting to
/// `EmptyEnv`) is expressed the ordinary Rust way: a blanket impl keyed on
/// the *tag*, not on this trait, so any caller lacking a more specific impl
/// still compiles against the default.
pub trait Dispatch<T: Tag, Args> {
    /// What `tag(self, args)` produces.
    type Output;

    /// Perform the dispatch.
    fn dispatch(self, tag: T, args: Args) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone)]
    struct DoubleTag;
    impl Tag for DoubleTag {}

    struct Number(i32);
    impl Dispatch<DoubleTag, ()> for Number {
        type Output = i32;
        fn dispatch(self, _tag: DoubleTag, _args: ()) -> i32 {
            self.0 * 2
        }
    }

    #[test]
    fn dispatch_resolves_to_the_argument_types_impl() {
        let n = Number(21);
        assert_eq!(n.dispatch(DoubleTag, ()), 42);
    }
}
