//! Sender adaptors: `let_value`/`let_error`/`let_stopped`,
//! `then`/`upon_error`/`upon_stopped`, `bulk`, `into_variant`,
//! `stopped_as_optional`, `stopped_as_error`, and the scheduler-affinity
//! trio `on`/`schedule_from`/`transfer`.
//!
//! Rust has no single type parameter that can pick "which trait method do I
//! override," so `let_value`/`let_error`/`let_stopped` are three separate
//! small structs rather than one template parameterized over the
//! intercepted channel; they share their shape closely enough that the
//! duplication reads as a family, not as independent code.
//! `then`/`upon_error`/`upon_stopped` are then built directly on top of the
//! matching `let_*`.

use std::marker::PhantomData;
use vkr_env::{
    CompletionSignaturesLike, Either, GetAllocator, GetCompletionScheduler, GetStopToken, HasEnv,
    Never, Or, Signatures, StoppedFlag, StoppedNo, StoppedYes,
};

use crate::sender::{connect_and_start, Connect, OperationState, Receiver, Sender};

// ---------------------------------------------------------------------
// let_value / let_error / let_stopped
// ---------------------------------------------------------------------

/// Receiver used to connect the source of a [`LetValue`]: on `set_value` it
/// runs `f` and delegates the rest of the pipeline to the sender `f`
/// produces; `set_error`/`set_stopped` pass through to the outer receiver
/// untouched (wrapped on the left of an `Either` for the error channel,
/// since the outer receiver's error type now has to accept either source).
pub struct LetValueReceiver<V, E, F, S2, R> {
    f: F,
    outer: R,
    _marker: PhantomData<fn(V, E) -> S2>,
}

impl<V, E, F, S2, R: HasEnv> HasEnv for LetValueReceiver<V, E, F, S2, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<V, E, F, S2, S2Sigs, R> Receiver for LetValueReceiver<V, E, F, S2, R>
where
    F: FnOnce(V) -> S2,
    S2: Sender<Sigs = S2Sigs>,
    S2Sigs: CompletionSignaturesLike,
    S2: Connect<LetValueContinuation<E, S2Sigs::Error, R>>,
    R: Receiver<
        Value = S2Sigs::Value,
        Error = Either<E, S2Sigs::Error>,
    >,
{
    type Value = V;
    type Error = E;

    fn set_value(self, value: V) {
        let next = (self.f)(value);
        let continuation = LetValueContinuation {
            outer: self.outer,
            _marker: PhantomData,
        };
        connect_and_start(next, continuation);
    }

    fn set_error(self, error: E) {
        self.outer.set_error(Either::Left(error));
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// Bridges `f`'s sender (`S2`) back onto the outer receiver: `S2` is
/// connected to one of these rather than to the outer receiver directly, so
/// it sees its own unwrapped error type instead of the `Either` the outer
/// receiver actually expects. Forwards `set_value` untouched and wraps
/// `set_error` on the right of the `Either`.
pub struct LetValueContinuation<E, E2, R> {
    outer: R,
    _marker: PhantomData<fn(E, E2)>,
}

impl<E, E2, R: HasEnv> HasEnv for LetValueContinuation<E, E2, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<E, E2, R> Receiver for LetValueContinuation<E, E2, R>
where
    R: Receiver<Error = Either<E, E2>>,
{
    type Value = R::Value;
    type Error = E2;

    fn set_value(self, value: R::Value) {
        self.outer.set_value(value);
    }

    fn set_error(self, error: E2) {
        self.outer.set_error(Either::Right(error));
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// A sender that runs `f(value)` when its source completes with a value,
/// then delegates entirely to the sender `f` returns. The source's error
/// and stopped completions pass through untouched.
pub struct LetValue<S, F, S2> {
    source: S,
    f: F,
    _marker: PhantomData<fn() -> S2>,
}

/// `let_value(source, f)`.
pub fn let_value<S, F, S2>(source: S, f: F) -> LetValue<S, F, S2>
where
    S: Sender,
    F: FnOnce(<S::Sigs as CompletionSignaturesLike>::Value) -> S2,
    S2: Sender,
{
    LetValue {
        source,
        f,
        _marker: PhantomData,
    }
}

impl<S: HasEnv, F, S2> HasEnv for LetValue<S, F, S2> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S, F, S2> Sender for LetValue<S, F, S2>
where
    S: Sender,
    S2: Sender,
{
    type Sigs = Signatures<
        <S2::Sigs as CompletionSignaturesLike>::Value,
        Either<<S::Sigs as CompletionSignaturesLike>::Error, <S2::Sigs as CompletionSignaturesLike>::Error>,
        Or<<S::Sigs as CompletionSignaturesLike>::Stopped, <S2::Sigs as CompletionSignaturesLike>::Stopped>,
    >;
}

/// The operation state produced by connecting a [`LetValue`] sender.
pub struct LetValueOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for LetValueOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, SSigs, F, S2, S2Sigs, R> Connect<R> for LetValue<S, F, S2>
where
    S: Sender<Sigs = SSigs>,
    SSigs: CompletionSignaturesLike,
    S2: Sender<Sigs = S2Sigs>,
    S2Sigs: CompletionSignaturesLike,
    S2: Connect<LetValueContinuation<SSigs::Error, S2Sigs::Error, R>>,
    S: Connect<LetValueReceiver<SSigs::Value, SSigs::Error, F, S2, R>>,
    F: FnOnce(SSigs::Value) -> S2,
    R: Receiver<
        Value = S2Sigs::Value,
        Error = Either<SSigs::Error, S2Sigs::Error>,
    >,
{
    type Op = LetValueOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        let inner = LetValueReceiver {
            f: self.f,
            outer: receiver,
            _marker: PhantomData,
        };
        LetValueOp {
            op: self.source.connect(inner),
        }
    }
}

/// Receiver used to connect the source of a [`LetError`].
pub struct LetErrorReceiver<V, E, F, S2, R> {
    f: F,
    outer: R,
    _marker: PhantomData<fn(V, E) -> S2>,
}

impl<V, E, F, S2, R: HasEnv> HasEnv for LetErrorReceiver<V, E, F, S2, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<V, E, F, S2, S2Sigs, R> Receiver for LetErrorReceiver<V, E, F, S2, R>
where
    F: FnOnce(E) -> S2,
    S2: Sender<Sigs = S2Sigs>,
    S2Sigs: CompletionSignaturesLike,
    S2: Connect<LetErrorContinuation<V, S2Sigs::Value, R>>,
    R: Receiver<
        Value = Either<V, S2Sigs::Value>,
        Error = S2Sigs::Error,
    >,
{
    type Value = V;
    type Error = E;

    fn set_value(self, value: V) {
        self.outer.set_value(Either::Left(value));
    }

    fn set_error(self, error: E) {
        let next = (self.f)(error);
        let continuation = LetErrorContinuation {
            outer: self.outer,
            _marker: PhantomData,
        };
        connect_and_start(next, continuation);
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// Bridges `f`'s sender (`S2`) back onto the outer receiver for
/// [`LetErrorReceiver`], the mirror image of [`LetValueContinuation`]: wraps
/// `set_value` on the right of the `Either` and forwards `set_error`
/// untouched.
pub struct LetErrorContinuation<V, V2, R> {
    outer: R,
    _marker: PhantomData<fn(V, V2)>,
}

impl<V, V2, R: HasEnv> HasEnv for LetErrorContinuation<V, V2, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<V, V2, R> Receiver for LetErrorContinuation<V, V2, R>
where
    R: Receiver<Value = Either<V, V2>>,
{
    type Value = V2;
    type Error = R::Error;

    fn set_value(self, value: V2) {
        self.outer.set_value(Either::Right(value));
    }

    fn set_error(self, error: R::Error) {
        self.outer.set_error(error);
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// A sender that runs `f(error)` when its source completes with an error,
/// then delegates entirely to the sender `f` returns. The source's value
/// and stopped completions pass through untouched.
pub struct LetError<S, F, S2> {
    source: S,
    f: F,
    _marker: PhantomData<fn() -> S2>,
}

/// `let_error(source, f)`.
pub fn let_error<S, F, S2>(source: S, f: F) -> LetError<S, F, S2>
where
    S: Sender,
    F: FnOnce(<S::Sigs as CompletionSignaturesLike>::Error) -> S2,
    S2: Sender,
{
    LetError {
        source,
        f,
        _marker: PhantomData,
    }
}

impl<S: HasEnv, F, S2> HasEnv for LetError<S, F, S2> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S, F, S2> Sender for LetError<S, F, S2>
where
    S: Sender,
    S2: Sender,
{
    type Sigs = Signatures<
        Either<<S::Sigs as CompletionSignaturesLike>::Value, <S2::Sigs as CompletionSignaturesLike>::Value>,
        <S2::Sigs as CompletionSignaturesLike>::Error,
        Or<<S::Sigs as CompletionSignaturesLike>::Stopped, <S2::Sigs as CompletionSignaturesLike>::Stopped>,
    >;
}

/// The operation state produced by connecting a [`LetError`] sender.
pub struct LetErrorOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for LetErrorOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, SSigs, F, S2, S2Sigs, R> Connect<R> for LetError<S, F, S2>
where
    S: Sender<Sigs = SSigs>,
    SSigs: CompletionSignaturesLike,
    S2: Sender<Sigs = S2Sigs>,
    S2Sigs: CompletionSignaturesLike,
    S2: Connect<LetErrorContinuation<SSigs::Value, S2Sigs::Value, R>>,
    S: Connect<LetErrorReceiver<SSigs::Value, SSigs::Error, F, S2, R>>,
    F: FnOnce(SSigs::Error) -> S2,
    R: Receiver<
        Value = Either<SSigs::Value, S2Sigs::Value>,
        Error = S2Sigs::Error,
    >,
{
    type Op = LetErrorOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        let inner = LetErrorReceiver {
            f: self.f,
            outer: receiver,
            _marker: PhantomData,
        };
        LetErrorOp {
            op: self.source.connect(inner),
        }
    }
}

/// Receiver used to connect the source of a [`LetStopped`].
pub struct LetStoppedReceiver<V, E, F, S2, R> {
    f: F,
    outer: R,
    _marker: PhantomData<fn(V, E) -> S2>,
}

impl<V, E, F, S2, R: HasEnv> HasEnv for LetStoppedReceiver<V, E, F, S2, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<V, E, F, S2, S2Sigs, R> Receiver for LetStoppedReceiver<V, E, F, S2, R>
where
    F: FnOnce() -> S2,
    S2: Sender<Sigs = S2Sigs>,
    S2Sigs: CompletionSignaturesLike,
    S2: Connect<
        LetStoppedContinuation<
            V,
            S2Sigs::Value,
            E,
            S2Sigs::Error,
            R,
        >,
    >,
    R: Receiver<
        Value = Either<V, S2Sigs::Value>,
        Error = Either<E, S2Sigs::Error>,
    >,
{
    type Value = V;
    type Error = E;

    fn set_value(self, value: V) {
        self.outer.set_value(Either::Left(value));
    }

    fn set_error(self, error: E) {
        self.outer.set_error(Either::Left(error));
    }

    fn set_stopped(self) {
        let next = (self.f)();
        let continuation = LetStoppedContinuation {
            outer: self.outer,
            _marker: PhantomData,
        };
        connect_and_start(next, continuation);
    }
}

/// Bridges `f`'s sender (`S2`) back onto the outer receiver for
/// [`LetStoppedReceiver`]: both channels get wrapped, since a
/// [`LetStopped`] sender's outer receiver expects `Either` on the value
/// *and* the error channel.
pub struct LetStoppedContinuation<V, V2, E, E2, R> {
    outer: R,
    _marker: PhantomData<fn(V, V2, E, E2)>,
}

impl<V, V2, E, E2, R: HasEnv> HasEnv for LetStoppedContinuation<V, V2, E, E2, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<V, V2, E, E2, R> Receiver for LetStoppedContinuation<V, V2, E, E2, R>
where
    R: Receiver<Value = Either<V, V2>, Error = Either<E, E2>>,
{
    type Value = V2;
    type Error = E2;

    fn set_value(self, value: V2) {
        self.outer.set_value(Either::Right(value));
    }

    fn set_error(self, error: E2) {
        self.outer.set_error(Either::Right(error));
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// A sender that runs `f()` when its source completes with `set_stopped`,
/// then delegates entirely to the sender `f` returns. The source's value
/// and error completions pass through untouched.
pub struct LetStopped<S, F, S2> {
    source: S,
    f: F,
    _marker: PhantomData<fn() -> S2>,
}

/// `let_stopped(source, f)`.
pub fn let_stopped<S, F, S2>(source: S, f: F) -> LetStopped<S, F, S2>
where
    S: Sender,
    F: FnOnce() -> S2,
    S2: Sender,
{
    LetStopped {
        source,
        f,
        _marker: PhantomData,
    }
}

impl<S: HasEnv, F, S2> HasEnv for LetStopped<S, F, S2> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S, F, S2> Sender for LetStopped<S, F, S2>
where
    S: Sender,
    S2: Sender,
{
    type Sigs = Signatures<
        Either<<S::Sigs as CompletionSignaturesLike>::Value, <S2::Sigs as CompletionSignaturesLike>::Value>,
        Either<<S::Sigs as CompletionSignaturesLike>::Error, <S2::Sigs as CompletionSignaturesLike>::Error>,
        <S2::Sigs as CompletionSignaturesLike>::Stopped,
    >;
}

/// The operation state produced by connecting a [`LetStopped`] sender.
pub struct LetStoppedOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for LetStoppedOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, SSigs, F, S2, S2Sigs, R> Connect<R> for LetStopped<S, F, S2>
where
    S: Sender<Sigs = SSigs>,
    SSigs: CompletionSignaturesLike,
    S2: Sender<Sigs = S2Sigs>,
    S2Sigs: CompletionSignaturesLike,
    S2: Connect<LetStoppedContinuation<SSigs::Value, S2Sigs::Value, SSigs::Error, S2Sigs::Error, R>>,
    S: Connect<LetStoppedReceiver<SSigs::Value, SSigs::Error, F, S2, R>>,
    F: FnOnce() -> S2,
    R: Receiver<
        Value = Either<SSigs::Value, S2Sigs::Value>,
        Error = Either<SSigs::Error, S2Sigs::Error>,
    >,
{
    type Op = LetStoppedOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        let inner = LetStoppedReceiver {
            f: self.f,
            outer: receiver,
            _marker: PhantomData,
        };
        LetStoppedOp {
            op: self.source.connect(inner),
        }
    }
}

// ---------------------------------------------------------------------
// collapse_error_right / collapse_value_left
// ---------------------------------------------------------------------

/// Receiver that collapses an `Either<E, Never>` error completion down to
/// the bare `E` the outer receiver wants, passing value and stopped
/// completions through untouched.
pub struct CollapseErrorRightReceiver<R> {
    outer: R,
}

impl<R: HasEnv> HasEnv for CollapseErrorRightReceiver<R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<R> Receiver for CollapseErrorRightReceiver<R>
where
    R: Receiver,
{
    type Value = R::Value;
    type Error = Either<R::Error, Never>;

    fn set_value(self, value: R::Value) {
        self.outer.set_value(value);
    }

    fn set_error(self, error: Either<R::Error, Never>) {
        self.outer.set_error(error.into_left());
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// A sender that collapses a source whose error channel is always
/// `Either<E, Never>` down to the bare `E`. `let_value`/`let_error`/
/// `let_stopped`'s splice formula widens whichever channel it doesn't
/// touch to an `Either` of both sides' shapes, which is the right thing
/// when both sides really can produce it — but when the continuation is
/// always [`Just`] (whose error channel is `Never`), that widening is
/// pure noise nobody downstream should have to see. `then` collapses it
/// away with this.
pub struct CollapseErrorRight<S, E> {
    source: S,
    _marker: PhantomData<fn() -> E>,
}

/// `collapse_error_right(source)`.
pub fn collapse_error_right<S, E>(source: S) -> CollapseErrorRight<S, E>
where
    S: Sender,
    S::Sigs: CompletionSignaturesLike<Error = Either<E, Never>>,
{
    CollapseErrorRight {
        source,
        _marker: PhantomData,
    }
}

impl<S: HasEnv, E> HasEnv for CollapseErrorRight<S, E> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S, E> Sender for CollapseErrorRight<S, E>
where
    S: Sender,
    S::Sigs: CompletionSignaturesLike<Error = Either<E, Never>>,
    E: 'static,
{
    type Sigs = Signatures<
        <S::Sigs as CompletionSignaturesLike>::Value,
        E,
        <S::Sigs as CompletionSignaturesLike>::Stopped,
    >;
}

/// The operation state produced by connecting a [`CollapseErrorRight`].
pub struct CollapseErrorRightOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for CollapseErrorRightOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, E, R> Connect<R> for CollapseErrorRight<S, E>
where
    S: Connect<CollapseErrorRightReceiver<R>>,
    S::Sigs: CompletionSignaturesLike<Error = Either<E, Never>>,
    R: Receiver<Error = E>,
    E: 'static,
{
    type Op = CollapseErrorRightOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        CollapseErrorRightOp {
            op: self.source.connect(CollapseErrorRightReceiver { outer: receiver }),
        }
    }
}

/// Receiver that collapses an `Either<Never, V>` value completion down to
/// the bare `V` the outer receiver wants, passing error and stopped
/// completions through untouched.
pub struct CollapseValueLeftReceiver<R> {
    outer: R,
}

impl<R: HasEnv> HasEnv for CollapseValueLeftReceiver<R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<R> Receiver for CollapseValueLeftReceiver<R>
where
    R: Receiver,
{
    type Value = Either<Never, R::Value>;
    type Error = R::Error;

    fn set_value(self, value: Either<Never, R::Value>) {
        self.outer.set_value(value.into_right());
    }

    fn set_error(self, error: R::Error) {
        self.outer.set_error(error);
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// A sender that collapses a source whose value channel is always
/// `Either<Never, V>` down to the bare `V`. The counterpart to
/// [`CollapseErrorRight`] for the value channel; `upon_error` and
/// `upon_stopped` use it to narrow back down to a bare recovered value
/// when the source they're recovering can never itself succeed.
pub struct CollapseValueLeft<S, V> {
    source: S,
    _marker: PhantomData<fn() -> V>,
}

/// `collapse_value_left(source)`.
pub fn collapse_value_left<S, V>(source: S) -> CollapseValueLeft<S, V>
where
    S: Sender,
    S::Sigs: CompletionSignaturesLike<Value = Either<Never, V>>,
{
    CollapseValueLeft {
        source,
        _marker: PhantomData,
    }
}

impl<S: HasEnv, V> HasEnv for CollapseValueLeft<S, V> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S, V> Sender for CollapseValueLeft<S, V>
where
    S: Sender,
    S::Sigs: CompletionSignaturesLike<Value = Either<Never, V>>,
    V: 'static,
{
    type Sigs = Signatures<
        V,
        <S::Sigs as CompletionSignaturesLike>::Error,
        <S::Sigs as CompletionSignaturesLike>::Stopped,
    >;
}

/// The operation state produced by connecting a [`CollapseValueLeft`].
pub struct CollapseValueLeftOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for CollapseValueLeftOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, V, R> Connect<R> for CollapseValueLeft<S, V>
where
    S: Connect<CollapseValueLeftReceiver<R>>,
    S::Sigs: CompletionSignaturesLike<Value = Either<Never, V>>,
    R: Receiver<Value = V>,
    V: 'static,
{
    type Op = CollapseValueLeftOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        CollapseValueLeftOp {
            op: self.source.connect(CollapseValueLeftReceiver { outer: receiver }),
        }
    }
}

// ---------------------------------------------------------------------
// then / upon_error / upon_stopped
// ---------------------------------------------------------------------

use crate::factories::{just, Just};

/// `then(source, f)`: transforms a value completion with an infallible
/// `f`, leaving stopped completions untouched. Built on `let_value`
/// against a `Just` continuation, whose error channel is always `Never`;
/// `collapse_error_right` folds that back out of the result instead of
/// leaking the `Either<source error, Never>` the general splice formula
/// would otherwise widen it to.
pub fn then<S, F, Out>(
    source: S,
    f: F,
) -> CollapseErrorRight<
    LetValue<S, impl FnOnce(<S::Sigs as CompletionSignaturesLike>::Value) -> Just<Out>, Just<Out>>,
    <S::Sigs as CompletionSignaturesLike>::Error,
>
where
    S: Sender,
    F: FnOnce(<S::Sigs as CompletionSignaturesLike>::Value) -> Out,
{
    collapse_error_right(let_value(source, move |value| just(f(value))))
}

/// `upon_error(source, f)`: transforms an error completion with an
/// infallible `f`, leaving stopped completions untouched. Restricted to
/// sources whose value channel is `Never` — sources that can error but
/// never themselves succeed, e.g. `just_error` — so the recovered value
/// `collapse_value_left` produces is the bare `Out`, not an
/// `Either<Never, Out>`. Sources that can do both should use the fully
/// general `let_error` directly.
pub fn upon_error<S, F, Out>(
    source: S,
    f: F,
) -> CollapseValueLeft<LetError<S, impl FnOnce(<S::Sigs as CompletionSignaturesLike>::Error) -> Just<Out>, Just<Out>>, Out>
where
    S: Sender,
    S::Sigs: CompletionSignaturesLike<Value = Never>,
    F: FnOnce(<S::Sigs as CompletionSignaturesLike>::Error) -> Out,
{
    collapse_value_left(let_error(source, move |error| just(f(error))))
}

/// `upon_stopped(source, f)`: transforms a stopped completion into a value
/// completion, leaving error completions untouched. Restricted the same
/// way as [`upon_error`]: the source's value channel must be `Never`
/// (e.g. `just_stopped`), so both the error-channel and value-channel
/// widening `let_stopped`'s splice formula introduces collapse back out,
/// leaving the bare `Out`.
pub fn upon_stopped<S, F, Out>(
    source: S,
    f: F,
) -> CollapseValueLeft<
    CollapseErrorRight<
        LetStopped<S, impl FnOnce() -> Just<Out>, Just<Out>>,
        <S::Sigs as CompletionSignaturesLike>::Error,
    >,
    Out,
>
where
    S: Sender,
    S::Sigs: CompletionSignaturesLike<Value = Never>,
    F: FnOnce() -> Out,
{
    collapse_value_left(collapse_error_right(let_stopped(source, move || just(f()))))
}

// ---------------------------------------------------------------------
// bulk
// ---------------------------------------------------------------------

/// A sender that, once its source produces a value, calls `f(index,
/// &mut value)` once per `index` in `0..shape` before forwarding the
/// (possibly mutated) value onward. Runs sequentially on the calling
/// thread by default — parallelizing `bulk` across a scheduler's workers
/// is left to a scheduler-specific `bulk` customization this crate does
/// not provide; running sequentially on the calling thread is always a
/// correct (if unparallelized) fallback.
pub struct Bulk<S, F> {
    source: S,
    shape: usize,
    f: F,
}

/// `bulk(source, shape, f)`.
pub fn bulk<S, F>(source: S, shape: usize, f: F) -> Bulk<S, F>
where
    S: Sender,
    F: Fn(usize, &mut <S::Sigs as CompletionSignaturesLike>::Value) + Clone,
{
    Bulk { source, shape, f }
}

impl<S: HasEnv, F> HasEnv for Bulk<S, F> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S, F> Sender for Bulk<S, F>
where
    S: Sender,
{
    type Sigs = S::Sigs;
}

/// Receiver used to connect the source of a [`Bulk`].
pub struct BulkReceiver<F, R> {
    shape: usize,
    f: F,
    outer: R,
}

impl<F, R: HasEnv> HasEnv for BulkReceiver<F, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<F, R> Receiver for BulkReceiver<F, R>
where
    F: Fn(usize, &mut R::Value),
    R: Receiver,
{
    type Value = R::Value;
    type Error = R::Error;

    fn set_value(self, mut value: R::Value) {
        for i in 0..self.shape {
            (self.f)(i, &mut value);
        }
        self.outer.set_value(value);
    }

    fn set_error(self, error: R::Error) {
        self.outer.set_error(error);
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// The operation state produced by connecting a [`Bulk`] sender.
pub struct BulkOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for BulkOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, F, R> Connect<R> for Bulk<S, F>
where
    S: Connect<BulkReceiver<F, R>>,
    F: Fn(usize, &mut <S::Sigs as CompletionSignaturesLike>::Value),
    R: Receiver<
        Value = <S::Sigs as CompletionSignaturesLike>::Value,
        Error = <S::Sigs as CompletionSignaturesLike>::Error,
    >,
{
    type Op = BulkOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        let inner = BulkReceiver {
            shape: self.shape,
            f: self.f,
            outer: receiver,
        };
        BulkOp {
            op: self.source.connect(inner),
        }
    }
}

// ---------------------------------------------------------------------
// stopped_as_optional / stopped_as_error
// ---------------------------------------------------------------------

/// Receiver that folds a stopped completion into `set_value(None)`.
pub struct StoppedAsOptionalReceiver<V, R> {
    outer: R,
    _marker: PhantomData<fn(V)>,
}

impl<V, R: HasEnv> HasEnv for StoppedAsOptionalReceiver<V, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<V, R> Receiver for StoppedAsOptionalReceiver<V, R>
where
    R: Receiver<Value = Option<V>>,
{
    type Value = V;
    type Error = R::Error;

    fn set_value(self, value: V) {
        self.outer.set_value(Some(value));
    }

    fn set_error(self, error: R::Error) {
        self.outer.set_error(error);
    }

    fn set_stopped(self) {
        self.outer.set_value(None);
    }
}

/// A sender that never sends `set_stopped`; a stopped source instead
/// completes with `set_value(None)`, and a value completion is wrapped in
/// `Some`.
pub struct StoppedAsOptional<S> {
    source: S,
}

/// `stopped_as_optional(source)`.
pub fn stopped_as_optional<S: Sender>(source: S) -> StoppedAsOptional<S> {
    StoppedAsOptional { source }
}

impl<S: HasEnv> HasEnv for StoppedAsOptional<S> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S: Sender> Sender for StoppedAsOptional<S> {
    type Sigs = Signatures<
        Option<<S::Sigs as CompletionSignaturesLike>::Value>,
        <S::Sigs as CompletionSignaturesLike>::Error,
        StoppedNo,
    >;
}

/// The operation state produced by connecting a [`StoppedAsOptional`].
pub struct StoppedAsOptionalOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for StoppedAsOptionalOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, SSigs, R> Connect<R> for StoppedAsOptional<S>
where
    S: Sender<Sigs = SSigs>,
    SSigs: CompletionSignaturesLike,
    S: Connect<StoppedAsOptionalReceiver<SSigs::Value, R>>,
    R: Receiver<
        Value = Option<SSigs::Value>,
        Error = SSigs::Error,
    >,
{
    type Op = StoppedAsOptionalOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        StoppedAsOptionalOp {
            op: self.source.connect(StoppedAsOptionalReceiver {
                outer: receiver,
                _marker: PhantomData,
            }),
        }
    }
}

/// Receiver that folds a stopped completion into `set_error`, converting
/// it via `FromStopped`.
pub struct StoppedAsErrorReceiver<R> {
    outer: R,
}

impl<R: HasEnv> HasEnv for StoppedAsErrorReceiver<R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<R> Receiver for StoppedAsErrorReceiver<R>
where
    R: Receiver,
    R::Error: FromStopped,
{
    type Value = R::Value;
    type Error = R::Error;

    fn set_value(self, value: R::Value) {
        self.outer.set_value(value);
    }

    fn set_error(self, error: R::Error) {
        self.outer.set_error(error);
    }

    fn set_stopped(self) {
        self.outer.set_error(R::Error::from_stopped());
    }
}

/// A value an error channel can take to represent "the operation was
/// cancelled," so `stopped_as_error` has something to construct.
pub trait FromStopped {
    /// Builds the value representing cancellation.
    fn from_stopped() -> Self;
}

/// A sender that never sends `set_stopped`; a stopped source instead
/// completes with `set_error(E::from_stopped())`.
pub struct StoppedAsError<S, E> {
    source: S,
    _marker: PhantomData<E>,
}

/// `stopped_as_error(source)`, with the error type inferred from context.
pub fn stopped_as_error<S: Sender, E: FromStopped>(source: S) -> StoppedAsError<S, E> {
    StoppedAsError {
        source,
        _marker: PhantomData,
    }
}

impl<S: HasEnv, E> HasEnv for StoppedAsError<S, E> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S: Sender, E: FromStopped + 'static> Sender for StoppedAsError<S, E> {
    type Sigs = Signatures<<S::Sigs as CompletionSignaturesLike>::Value, E, StoppedNo>;
}

/// The operation state produced by connecting a [`StoppedAsError`].
pub struct StoppedAsErrorOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for StoppedAsErrorOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, E, R> Connect<R> for StoppedAsError<S, E>
where
    S: Connect<StoppedAsErrorReceiver<R>>,
    E: FromStopped + 'static,
    R: Receiver<Value = <S::Sigs as CompletionSignaturesLike>::Value, Error = E>,
{
    type Op = StoppedAsErrorOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        StoppedAsErrorOp {
            op: self.source.connect(StoppedAsErrorReceiver { outer: receiver }),
        }
    }
}

// ---------------------------------------------------------------------
// into_variant
// ---------------------------------------------------------------------

/// The gathered shape `into_variant` produces. A sender in general could
/// complete with any of several value shapes, gathered into a variant over
/// all of them; every sender in this workspace has exactly one value shape,
/// so that variant collapses to a single-armed wrapper around the one
/// shape a concrete sender can actually send. Kept as its own type (rather
/// than just handing back the value) so call sites document the lowering
/// by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleVariant<T>(pub T);

/// Receiver that wraps a value completion in [`SingleVariant`].
pub struct IntoVariantReceiver<V, R> {
    outer: R,
    _marker: PhantomData<fn(V)>,
}

impl<V, R: HasEnv> HasEnv for IntoVariantReceiver<V, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<V, R> Receiver for IntoVariantReceiver<V, R>
where
    R: Receiver<Value = SingleVariant<V>>,
{
    type Value = V;
    type Error = R::Error;

    fn set_value(self, value: V) {
        self.outer.set_value(SingleVariant(value));
    }

    fn set_error(self, error: R::Error) {
        self.outer.set_error(error);
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// A sender that wraps its source's value completion in [`SingleVariant`].
pub struct IntoVariant<S> {
    source: S,
}

/// `into_variant(source)`.
pub fn into_variant<S: Sender>(source: S) -> IntoVariant<S> {
    IntoVariant { source }
}

impl<S: HasEnv> HasEnv for IntoVariant<S> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S: Sender> Sender for IntoVariant<S> {
    type Sigs = Signatures<
        SingleVariant<<S::Sigs as CompletionSignaturesLike>::Value>,
        <S::Sigs as CompletionSignaturesLike>::Error,
        <S::Sigs as CompletionSignaturesLike>::Stopped,
    >;
}

/// The operation state produced by connecting an [`IntoVariant`] sender.
pub struct IntoVariantOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for IntoVariantOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, SSigs, R> Connect<R> for IntoVariant<S>
where
    S: Sender<Sigs = SSigs>,
    SSigs: CompletionSignaturesLike,
    S: Connect<IntoVariantReceiver<SSigs::Value, R>>,
    R: Receiver<
        Value = SingleVariant<SSigs::Value>,
        Error = SSigs::Error,
    >,
{
    type Op = IntoVariantOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        IntoVariantOp {
            op: self.source.connect(IntoVariantReceiver {
                outer: receiver,
                _marker: PhantomData,
            }),
        }
    }
}

// ---------------------------------------------------------------------
// on / schedule_from / transfer
// ---------------------------------------------------------------------

use crate::scheduler::Scheduler;

/// `schedule_from(scheduler, source)`: starts `source` wherever it already
/// runs, then moves its completion onto `scheduler` before delivering it.
/// `transfer(source, scheduler)` is the same operation with its arguments
/// swapped to read left-to-right in a pipe chain; `on(scheduler, source)`
/// additionally starts `source` itself on `scheduler` rather than only
/// relaying its completion there. All three are expressed as `let_value`
/// over `schedule()`.
pub fn schedule_from<Sch, S>(
    scheduler: Sch,
    source: S,
) -> LetValue<S, impl FnOnce(<S::Sigs as CompletionSignaturesLike>::Value) -> ArriveWith<Sch::Sender, <S::Sigs as CompletionSignaturesLike>::Value>, ArriveWith<Sch::Sender, <S::Sigs as CompletionSignaturesLike>::Value>>
where
    Sch: Scheduler,
    S: Sender,
    <S::Sigs as CompletionSignaturesLike>::Value: Clone,
{
    let_value(source, move |value| arrive_with(scheduler.schedule(), value))
}

/// `transfer(source, scheduler)`: [`schedule_from`] with arguments in
/// pipe-chain order.
pub fn transfer<S, Sch>(
    source: S,
    scheduler: Sch,
) -> LetValue<S, impl FnOnce(<S::Sigs as CompletionSignaturesLike>::Value) -> ArriveWith<Sch::Sender, <S::Sigs as CompletionSignaturesLike>::Value>, ArriveWith<Sch::Sender, <S::Sigs as CompletionSignaturesLike>::Value>>
where
    Sch: Scheduler,
    S: Sender,
    <S::Sigs as CompletionSignaturesLike>::Value: Clone,
{
    schedule_from(scheduler, source)
}

/// `on(scheduler, source)`: runs `source` itself on `scheduler`, rather
/// than only relaying `source`'s eventual completion there the way
/// [`schedule_from`]/[`transfer`] do. `source` is connected through
/// [`WithSchedulerEnv`] so its own receiver's environment shadows
/// `get_scheduler` with `scheduler` — child work `source` itself starts
/// (e.g. further `on`/`schedule_from` calls with no scheduler named
/// explicitly) inherits the context `on` placed it on. Every other query
/// forwards to the outer environment untouched.
pub fn on<Sch, S>(
    scheduler: Sch,
    source: S,
) -> LetValue<
    Sch::Sender,
    impl FnOnce(<<Sch::Sender as Sender>::Sigs as CompletionSignaturesLike>::Value) -> WithSchedulerEnv<S, Sch>,
    WithSchedulerEnv<S, Sch>,
>
where
    Sch: Scheduler,
    S: Sender,
{
    let_value(scheduler.schedule(), move |_arrived| with_scheduler_env(source, scheduler))
}

/// The environment [`WithSchedulerEnv`] reports to the receiver it connects
/// its wrapped source to: `Base` (the outer receiver's own environment)
/// with `get_scheduler` shadowed by `scheduler`. Every other query this
/// crate knows how to forward (`get_allocator`, `get_stop_token`,
/// `get_completion_scheduler<Cpo>`) delegates to `Base`; `get_scheduler`
/// itself is implemented against this type from `vkr-sched`, the crate
/// that owns the `GetScheduler` trait — `vkr-exec` can't depend on
/// `vkr-sched` (the dependency already runs the other way), so the type
/// lives here and the shadowing impl lives there, mirroring how
/// `GetScheduler for EmptyEnv` already sits next to `InlineScheduler`
/// rather than next to `EmptyEnv` itself.
pub struct OnEnv<Base, Sch> {
    base: Base,
    scheduler: Sch,
}

impl<Base, Sch> OnEnv<Base, Sch> {
    /// The outer environment this one wraps.
    pub fn base(&self) -> &Base {
        &self.base
    }

    /// The scheduler this environment shadows `get_scheduler` with.
    pub fn scheduler(&self) -> &Sch {
        &self.scheduler
    }
}

impl<Base: Clone, Sch: Clone> Clone for OnEnv<Base, Sch> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<Base: GetAllocator, Sch: 'static> GetAllocator for OnEnv<Base, Sch> {
    type Allocator = Base::Allocator;
    fn get_allocator(&self) -> Self::Allocator {
        self.base.get_allocator()
    }
}

impl<Base: GetStopToken, Sch: 'static> GetStopToken for OnEnv<Base, Sch> {
    type Token = Base::Token;
    fn get_stop_token(&self) -> Self::Token {
        self.base.get_stop_token()
    }
}

impl<Cpo, Base: GetCompletionScheduler<Cpo>, Sch: 'static> GetCompletionScheduler<Cpo> for OnEnv<Base, Sch> {
    type Scheduler = Base::Scheduler;
    fn get_completion_scheduler(&self) -> Self::Scheduler {
        self.base.get_completion_scheduler()
    }
}

/// Receiver `WithSchedulerEnv` connects its wrapped source to: forwards
/// every completion to the outer receiver untouched, but reports
/// [`OnEnv`] from `get_env` instead of the outer receiver's own
/// environment, so anything `source` looks up sees `scheduler` shadowing
/// `get_scheduler`.
pub struct OnReceiver<R, Sch> {
    outer: R,
    scheduler: Sch,
}

impl<R: HasEnv, Sch: Clone + 'static> HasEnv for OnReceiver<R, Sch> {
    type Env = OnEnv<R::Env, Sch>;
    fn get_env(&self) -> Self::Env {
        OnEnv {
            base: self.outer.get_env(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<R, Sch> Receiver for OnReceiver<R, Sch>
where
    R: Receiver,
    Sch: Clone + 'static,
{
    type Value = R::Value;
    type Error = R::Error;

    fn set_value(self, value: R::Value) {
        self.outer.set_value(value);
    }

    fn set_error(self, error: R::Error) {
        self.outer.set_error(error);
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// A sender identical to `source` in every completion it can produce,
/// except that the receiver it connects `source` to reports [`OnEnv`]
/// (shadowing `get_scheduler` with `scheduler`) instead of forwarding the
/// outer receiver's environment unchanged. `on` builds this around its
/// `source` argument before handing it to `let_value`.
pub struct WithSchedulerEnv<S, Sch> {
    source: S,
    scheduler: Sch,
}

fn with_scheduler_env<S, Sch>(source: S, scheduler: Sch) -> WithSchedulerEnv<S, Sch> {
    WithSchedulerEnv { source, scheduler }
}

impl<S: HasEnv, Sch> HasEnv for WithSchedulerEnv<S, Sch> {
    type Env = S::Env;
    fn get_env(&self) -> S::Env {
        self.source.get_env()
    }
}

impl<S: Sender, Sch> Sender for WithSchedulerEnv<S, Sch> {
    type Sigs = S::Sigs;
}

/// The operation state produced by connecting a [`WithSchedulerEnv`].
pub struct WithSchedulerEnvOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for WithSchedulerEnvOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<S, Sch, R> Connect<R> for WithSchedulerEnv<S, Sch>
where
    S: Connect<OnReceiver<R, Sch>>,
    Sch: Clone + 'static,
    R: Receiver,
{
    type Op = WithSchedulerEnvOp<S::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        WithSchedulerEnvOp {
            op: self.source.connect(OnReceiver {
                outer: receiver,
                scheduler: self.scheduler,
            }),
        }
    }
}

/// A sender that, once `scheduler` arrives, sends `value` as its
/// completion. The building block `schedule_from`/`transfer` use to
/// deliver a value on a new scheduler.
pub struct ArriveWith<Sch, V> {
    schedule: Sch,
    value: V,
}

fn arrive_with<Sch, V>(schedule: Sch, value: V) -> ArriveWith<Sch, V> {
    ArriveWith { schedule, value }
}

impl<Sch: HasEnv, V> HasEnv for ArriveWith<Sch, V> {
    type Env = Sch::Env;
    fn get_env(&self) -> Sch::Env {
        self.schedule.get_env()
    }
}

impl<Sch: Sender, V: 'static> Sender for ArriveWith<Sch, V> {
    type Sigs = Signatures<V, <Sch::Sigs as CompletionSignaturesLike>::Error, <Sch::Sigs as CompletionSignaturesLike>::Stopped>;
}

/// Receiver used to connect the scheduling sender inside [`ArriveWith`].
pub struct ArriveWithReceiver<V, R> {
    value: V,
    outer: R,
}

impl<V, R: HasEnv> HasEnv for ArriveWithReceiver<V, R> {
    type Env = R::Env;
    fn get_env(&self) -> R::Env {
        self.outer.get_env()
    }
}

impl<V, R> Receiver for ArriveWithReceiver<V, R>
where
    R: Receiver<Value = V>,
{
    type Value = ();
    type Error = R::Error;

    fn set_value(self, (): ()) {
        self.outer.set_value(self.value);
    }

    fn set_error(self, error: R::Error) {
        self.outer.set_error(error);
    }

    fn set_stopped(self) {
        self.outer.set_stopped();
    }
}

/// The operation state produced by connecting an [`ArriveWith`] sender.
pub struct ArriveWithOp<Op> {
    op: Op,
}

impl<Op: OperationState> OperationState for ArriveWithOp<Op> {
    fn start(self) {
        self.op.start();
    }
}

impl<Sch, V, R> Connect<R> for ArriveWith<Sch, V>
where
    Sch: Connect<ArriveWithReceiver<V, R>>,
    R: Receiver<Value = V, Error = <Sch::Sigs as CompletionSignaturesLike>::Error>,
{
    type Op = ArriveWithOp<Sch::Op>;

    fn connect(self, receiver: R) -> Self::Op {
        ArriveWithOp {
            op: self.schedule.connect(ArriveWithReceiver {
                value: self.value,
                outer: receiver,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factories::{just, just_error, just_stopped};
    use crate::testing::CellReceiver;

    #[test]
    fn let_value_delegates_to_the_next_sender() {
        let pipeline = let_value(just(20), |v: i32| just(v + 1));
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(21));
    }

    #[test]
    fn let_error_recovers_into_a_value() {
        let pipeline = let_error(just_error("boom".to_string()), |e: String| just(e.len()));
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(Either::Right(4)));
    }

    #[test]
    fn let_stopped_recovers_into_a_value() {
        let pipeline = let_stopped(just_stopped(), || just(7));
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(Either::Right(7)));
    }

    #[test]
    fn then_transforms_a_value_completion() {
        let pipeline = then(just((1, " ", 0.5f64)), |(a, b, c): (i32, &str, f64)| {
            format!("{a}{b}{c}")
        });
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some("1 0.5".to_string()));
    }

    #[test]
    fn upon_error_transforms_an_error_completion() {
        let pipeline = upon_error(just_error("boom".to_string()), |e: String| e);
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some("boom".to_string()));
    }

    #[test]
    fn upon_stopped_transforms_a_stopped_completion() {
        let pipeline = upon_stopped(just_stopped(), || 7);
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(7));
    }

    #[test]
    fn bulk_mutates_each_index_in_place() {
        let pipeline = bulk(just(vec![0; 5]), 5, |i, v: &mut Vec<i32>| v[i] = (i * i) as i32);
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(vec![0, 1, 4, 9, 16]));
    }

    #[test]
    fn stopped_as_optional_wraps_a_value() {
        let pipeline = stopped_as_optional(just(5));
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(Some(5)));
    }

    #[test]
    fn stopped_as_optional_folds_stopped_into_none() {
        let pipeline = stopped_as_optional(just_stopped());
        let cell = CellReceiver::<Option<i32>, Never>::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(None));
    }

    impl FromStopped for String {
        fn from_stopped() -> Self {
            "cancelled".to_string()
        }
    }

    #[test]
    fn stopped_as_error_folds_stopped_into_an_error() {
        let pipeline: StoppedAsError<JustStopped, String> = stopped_as_error(just_stopped());
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_error(), Some("cancelled".to_string()));
    }

    #[test]
    fn into_variant_wraps_the_value_in_a_single_variant() {
        let pipeline = into_variant(just(9));
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(SingleVariant(9)));
    }

    #[derive(Clone, PartialEq)]
    struct TestScheduler;

    impl HasEnv for TestScheduler {
        type Env = vkr_env::EmptyEnv;
        fn get_env(&self) -> vkr_env::EmptyEnv {
            vkr_env::EmptyEnv
        }
    }

    impl Scheduler for TestScheduler {
        type Sender = Just<()>;
        fn schedule(&self) -> Just<()> {
            just(())
        }
    }

    #[test]
    fn on_runs_the_source_after_arriving_on_the_scheduler() {
        let pipeline = on(TestScheduler, just(3));
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(3));
    }

    #[test]
    fn transfer_relays_the_value_through_the_scheduler() {
        let pipeline = transfer(just(3), TestScheduler);
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(3));
    }

    #[test]
    fn schedule_from_is_transfer_with_swapped_arguments() {
        let pipeline = schedule_from(TestScheduler, just(3));
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(3));
    }

    /// A sender whose only purpose is to report whether the receiver it
    /// was connected to advertises `TestScheduler` through [`OnEnv`].
    struct EnvProbe;

    impl HasEnv for EnvProbe {
        type Env = vkr_env::EmptyEnv;
        fn get_env(&self) -> vkr_env::EmptyEnv {
            vkr_env::EmptyEnv
        }
    }

    impl Sender for EnvProbe {
        type Sigs = Signatures<bool, Never, StoppedNo>;
    }

    struct EnvProbeOp<R> {
        receiver: R,
    }

    impl<R> OperationState for EnvProbeOp<R>
    where
        R: Receiver<Value = bool> + HasEnv<Env = OnEnv<vkr_env::EmptyEnv, TestScheduler>>,
    {
        fn start(self) {
            let env = self.receiver.get_env();
            let shadowed = *env.scheduler() == TestScheduler && *env.base() == vkr_env::EmptyEnv;
            self.receiver.set_value(shadowed);
        }
    }

    impl<R> Connect<R> for EnvProbe
    where
        R: Receiver<Value = bool> + HasEnv<Env = OnEnv<vkr_env::EmptyEnv, TestScheduler>>,
    {
        type Op = EnvProbeOp<R>;

        fn connect(self, receiver: R) -> Self::Op {
            EnvProbeOp { receiver }
        }
    }

    #[test]
    fn on_shadows_get_scheduler_in_the_sources_own_environment() {
        let pipeline = on(TestScheduler, EnvProbe);
        let cell = CellReceiver::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(true));
    }
}
