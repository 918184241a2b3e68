//! Completion-signature calculus.
//!
//! Every sender in this workspace is concrete: no sender type here ever
//! completes through more than one value shape, more than one error shape,
//! or an open-ended parameter pack of either. That collapses the general
//! `completion_signatures<Sigs...>` algebra down to exactly one value type,
//! one error type, and a stopped/not-stopped flag per sender — so rather
//! than reimplementing a type-level set, `Signatures<V, E, S>` just carries
//! those three directly, with `S` a marker selecting whether the stopped
//! channel is present. A parallel runtime structure, `SignatureSet`, mirrors
//! the same three facts as plain data for introspection and tests — logging
//! what a sender can complete with without needing the concrete types in
//! scope.

use std::any::type_name;
use std::marker::PhantomData;

/// An uninhabited type standing in for "this channel cannot happen." No
/// value of this type can ever be constructed.
#[derive(Debug)]
pub enum Never {}

/// The value carried when either of two alternatives could have produced
/// it — used to combine error channels when an adaptor's delegate sender
/// may fail in a new way without discarding how the source sender could
/// fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<A, B> {
    /// The left alternative.
    Left(A),
    /// The right alternative.
    Right(B),
}

impl<A> Either<A, Never> {
    /// Collapses `Either<A, Never>` down to `A`: the right arm can't happen.
    pub fn into_left(self) -> A {
        match self {
            Either::Left(a) => a,
            Either::Right(never) => match never {},
        }
    }
}

impl<B> Either<Never, B> {
    /// Collapses `Either<Never, B>` down to `B`: the left arm can't happen.
    pub fn into_right(self) -> B {
        match self {
            Either::Left(never) => match never {},
            Either::Right(b) => b,
        }
    }
}

/// Which completion channel a [`SignatureKind`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionTag {
    /// `set_value`.
    Value,
    /// `set_error`.
    Error,
    /// `set_stopped`.
    Stopped,
}

/// One entry in a [`SignatureSet`]: a channel plus a human-readable
/// description of the payload type(s) it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureKind {
    /// The completion channel.
    pub tag: CompletionTag,
    /// `std::any::type_name` of the payload, or `"()"` for `set_stopped`.
    pub shape: &'static str,
}

impl SignatureKind {
    /// Builds a `set_value` entry describing payload type `V`.
    pub fn value<V>() -> Self {
        Self {
            tag: CompletionTag::Value,
            shape: type_name::<V>(),
        }
    }

    /// Builds a `set_error` entry describing payload type `E`.
    pub fn error<E>() -> Self {
        Self {
            tag: CompletionTag::Error,
            shape: type_name::<E>(),
        }
    }

    /// Builds the `set_stopped` entry.
    pub fn stopped() -> Self {
        Self {
            tag: CompletionTag::Stopped,
            shape: "()",
        }
    }
}

/// A runtime, deduplicated description of every completion a sender can
/// produce. This is the one place `concat_sets`-style dedup actually
/// happens, since doing it honestly at the type level needs specialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureSet(Vec<SignatureKind>);

impl SignatureSet {
    /// An empty set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds `kind`, deduplicating against anything already present.
    pub fn insert(mut self, kind: SignatureKind) -> Self {
        if !self.0.contains(&kind) {
            self.0.push(kind);
        }
        self
    }

    /// Set union with another signature set, deduplicating.
    pub fn union(mut self, other: SignatureSet) -> Self {
        for kind in other.0 {
            if !self.0.contains(&kind) {
                self.0.push(kind);
            }
        }
        self
    }

    /// Does this set include a `set_stopped` completion?
    pub fn sends_stopped(&self) -> bool {
        self.0.iter().any(|k| k.tag == CompletionTag::Stopped)
    }

    /// Iterates every entry in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SignatureKind> {
        self.0.iter()
    }

    /// How many distinct completions this set describes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Marker selecting whether a [`Signatures`] includes a `set_stopped` arm.
pub trait StoppedFlag: 'static {
    /// Whether the channel this flag selects is present.
    const SENDS_STOPPED: bool;
}

/// Selects "this sender can complete with `set_stopped`."
#[derive(Debug, Clone, Copy)]
pub struct StoppedYes;
impl StoppedFlag for StoppedYes {
    const SENDS_STOPPED: bool = true;
}

/// Selects "this sender never completes with `set_stopped`."
#[derive(Debug, Clone, Copy)]
pub struct StoppedNo;
impl StoppedFlag for StoppedNo {
    const SENDS_STOPPED: bool = false;
}

/// Combines two stopped flags: present if either input is. Used by
/// adaptors that splice two senders together (`let_value` and friends),
/// where the result can be stopped if either half can be.
pub struct Or<A, B>(PhantomData<(A, B)>);
impl<A: StoppedFlag, B: StoppedFlag> StoppedFlag for Or<A, B> {
    const SENDS_STOPPED: bool = A::SENDS_STOPPED || B::SENDS_STOPPED;
}

/// Anything that can describe its own completion signatures, at both the
/// type level (`Value`, `Error`, `SENDS_STOPPED`) and at runtime
/// ([`describe`]).
pub trait CompletionSignaturesLike {
    /// The `set_value` payload type, or [`Never`] if this sender never
    /// sends a value.
    type Value: 'static;
    /// The `set_error` payload type, or [`Never`] if this sender never
    /// sends an error.
    type Error: 'static;
    /// The stopped-channel marker. Exposed as a type (not just the
    /// `SENDS_STOPPED` constant it carries) so adaptors that splice two
    /// signature sets together can combine the markers with [`Or`]
    /// instead of trying to pick between `StoppedYes`/`StoppedNo` based on
    /// a runtime-looking boolean.
    type Stopped: StoppedFlag;
    /// Whether this sender can complete with `set_stopped`.
    const SENDS_STOPPED: bool = Self::Stopped::SENDS_STOPPED;

    /// Builds the runtime description of this signature set.
    fn describe() -> SignatureSet {
        let mut set = SignatureSet::new();
        if type_name::<Self::Value>() != type_name::<Never>() {
            set = set.insert(SignatureKind::value::<Self::Value>());
        }
        if type_name::<Self::Error>() != type_name::<Never>() {
            set = set.insert(SignatureKind::error::<Self::Error>());
        }
        if Self::SENDS_STOPPED {
            set = set.insert(SignatureKind::stopped());
        }
        set
    }
}

/// A concrete, monomorphized completion signature: exactly one value
/// shape, one error shape, and a stopped flag.
pub struct Signatures<V, E, S>(PhantomData<(V, E, S)>);

impl<V: 'static, E: 'static, S: StoppedFlag> CompletionSignaturesLike for Signatures<V, E, S> {
    type Value = V;
    type Error = E;
    type Stopped = S;
}

/// Signatures for a sender that only ever sends a value of type `V`.
pub type ValueOnly<V> = Signatures<V, Never, StoppedNo>;

/// Signatures for a sender that only ever sends an error of type `E`.
pub type ErrorOnly<E> = Signatures<Never, E, StoppedNo>;

/// Signatures for a sender that only ever completes with `set_stopped`.
pub type StoppedOnly = Signatures<Never, Never, StoppedYes>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_only_describes_one_entry() {
        let set = ValueOnly::<i32>::describe();
        assert_eq!(set.len(), 1);
        assert!(!set.sends_stopped());
    }

    #[test]
    fn stopped_only_describes_the_stopped_entry() {
        let set = StoppedOnly::describe();
        assert_eq!(set.len(), 1);
        assert!(set.sends_stopped());
    }

    #[test]
    fn signature_set_union_deduplicates() {
        let a = ValueOnly::<i32>::describe();
        let b = Signatures::<i32, Never, StoppedYes>::describe();
        let union = a.union(b);
        assert_eq!(union.len(), 2);
        assert!(union.sends_stopped());
    }

    #[test]
    fn either_collapses_uninhabited_arm() {
        let e: Either<i32, Never> = Either::Left(7);
        assert_eq!(e.into_left(), 7);
    }
}
