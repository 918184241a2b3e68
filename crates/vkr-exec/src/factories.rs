//! Sender factories: senders with no upstream dependency, the leaves of a
//! pipeline.

use std::marker::PhantomData;

use vkr_env::{
    CompletionSignaturesLike, EmptyEnv, EnvQuery, HasEnv, Never, Signatures, StoppedNo, StoppedOnly,
};

use crate::adaptors::let_value;
use crate::scheduler::Scheduler;
use crate::sender::{Connect, OperationState, Receiver, Sender};

/// A sender that, once started, immediately completes with `value`.
pub struct Just<V> {
    value: V,
}

/// Builds a [`Just`] sender.
pub fn just<V>(value: V) -> Just<V> {
    Just { value }
}

impl<V> HasEnv for Just<V> {
    type Env = EmptyEnv;
    fn get_env(&self) -> EmptyEnv {
        EmptyEnv
    }
}

impl<V: 'static> Sender for Just<V> {
    type Sigs = Signatures<V, Never, StoppedNo>;
}

/// The operation state produced by connecting a [`Just`] sender.
pub struct JustOp<V, R> {
    value: V,
    receiver: R,
}

impl<V, R: Receiver<Value = V>> OperationState for JustOp<V, R> {
    fn start(self) {
        self.receiver.set_value(self.value);
    }
}

impl<V, R: Receiver<Value = V>> Connect<R> for Just<V>
where
    Just<V>: Sender<Sigs = Signatures<V, Never, StoppedNo>>,
{
    type Op = JustOp<V, R>;

    fn connect(self, receiver: R) -> Self::Op {
        JustOp {
            value: self.value,
            receiver,
        }
    }
}

/// A sender that, once started, immediately completes with `error`.
pub struct JustError<E> {
    error: E,
}

/// Builds a [`JustError`] sender.
pub fn just_error<E>(error: E) -> JustError<E> {
    JustError { error }
}

impl<E> HasEnv for JustError<E> {
    type Env = EmptyEnv;
    fn get_env(&self) -> EmptyEnv {
        EmptyEnv
    }
}

impl<E: 'static> Sender for JustError<E> {
    type Sigs = Signatures<Never, E, StoppedNo>;
}

/// The operation state produced by connecting a [`JustError`] sender.
pub struct JustErrorOp<E, R> {
    error: E,
    receiver: R,
}

impl<E, R: Receiver<Error = E>> OperationState for JustErrorOp<E, R> {
    fn start(self) {
        self.receiver.set_error(self.error);
    }
}

impl<E, R: Receiver<Error = E>> Connect<R> for JustError<E>
where
    JustError<E>: Sender<Sigs = Signatures<Never, E, StoppedNo>>,
{
    type Op = JustErrorOp<E, R>;

    fn connect(self, receiver: R) -> Self::Op {
        JustErrorOp {
            error: self.error,
            receiver,
        }
    }
}

/// A sender that, once started, immediately completes with `set_stopped`.
pub struct JustStopped;

/// Builds a [`JustStopped`] sender.
pub fn just_stopped() -> JustStopped {
    JustStopped
}

impl HasEnv for JustStopped {
    type Env = EmptyEnv;
    fn get_env(&self) -> EmptyEnv {
        EmptyEnv
    }
}

impl Sender for JustStopped {
    type Sigs = StoppedOnly;
}

/// The operation state produced by connecting a [`JustStopped`] sender.
pub struct JustStoppedOp<R> {
    receiver: R,
}

impl<R: Receiver> OperationState for JustStoppedOp<R> {
    fn start(self) {
        self.receiver.set_stopped();
    }
}

impl<R: Receiver> Connect<R> for JustStopped {
    type Op = JustStoppedOp<R>;

    fn connect(self, receiver: R) -> Self::Op {
        JustStoppedOp { receiver }
    }
}

/// `read(Q)`: a sender that, at `start`, completes with
/// `Q(get_env(receiver))`. `E` names the receiver's environment type `Q`
/// expects to query; it is fixed when `read` is built rather than left to
/// vary per connection, since an associated type on `Sender` can't depend
/// on which receiver eventually connects to it. `Connect<R>` then requires
/// `R`'s actual environment to be that same `E`.
pub struct Read<Q, E> {
    query: Q,
    _marker: PhantomData<fn(E)>,
}

/// Builds a [`Read`] sender from the query `Q(get_env(r))` should apply.
pub fn read<Q, E>(query: Q) -> Read<Q, E>
where
    Q: EnvQuery<E>,
{
    Read {
        query,
        _marker: PhantomData,
    }
}

impl<Q, E> HasEnv for Read<Q, E> {
    type Env = EmptyEnv;
    fn get_env(&self) -> EmptyEnv {
        EmptyEnv
    }
}

impl<Q, E> Sender for Read<Q, E>
where
    Q: EnvQuery<E>,
    E: 'static,
    Q::Output: 'static,
{
    type Sigs = Signatures<Q::Output, Never, StoppedNo>;
}

/// The operation state produced by connecting a [`Read`] sender.
pub struct ReadOp<Q, R> {
    query: Q,
    receiver: R,
}

impl<Q, R> OperationState for ReadOp<Q, R>
where
    R: Receiver,
    Q: EnvQuery<R::Env, Output = R::Value>,
{
    fn start(self) {
        let env = self.receiver.get_env();
        let value = self.query.query(&env);
        self.receiver.set_value(value);
    }
}

impl<Q, E, R> Connect<R> for Read<Q, E>
where
    R: Receiver<Value = Q::Output> + HasEnv<Env = E>,
    Q: EnvQuery<E>,
{
    type Op = ReadOp<Q, R>;

    fn connect(self, receiver: R) -> Self::Op {
        ReadOp {
            query: self.query,
            receiver,
        }
    }
}

/// `get_stop_token_sender()`: `read(get_stop_token)`, spelled as its own
/// factory for the common case of wanting the connecting receiver's stop
/// token directly. `E` is inferred from whichever receiver's environment
/// the returned sender is eventually connected to.
pub fn get_stop_token_sender<E>() -> Read<vkr_env::GetStopTokenQuery, E>
where
    vkr_env::GetStopTokenQuery: EnvQuery<E>,
{
    read(vkr_env::GetStopTokenQuery)
}

/// `transfer_just(scheduler, value)`: equivalent to `just(value) |
/// transfer(scheduler)`, provided as its own factory because starting from
/// a value that already exists (rather than from a prior sender) is
/// common enough to name directly. Built by composing `schedule` with
/// `let_value` rather than as its own operation state.
pub fn transfer_just<Sch, V>(
    scheduler: Sch,
    value: V,
) -> crate::adaptors::LetValue<
    Sch::Sender,
    impl FnOnce(<<Sch::Sender as Sender>::Sigs as CompletionSignaturesLike>::Value) -> Just<V>,
    Just<V>,
>
where
    Sch: Scheduler,
    V: 'static,
{
    let_value(scheduler.schedule(), move |_unit| just(value))
}

#[cfg(test)]
mod tests {
    use vkr_core::NeverStopToken;

    use super::*;
    use crate::testing::CellReceiver;

    #[test]
    fn just_completes_with_its_value() {
        let cell = CellReceiver::<i32, Never>::new();
        just(42).connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(42));
    }

    #[test]
    fn just_error_completes_with_its_error() {
        let cell = CellReceiver::<Never, String>::new();
        just_error("boom".to_string()).connect(cell.clone()).start();
        assert_eq!(cell.take_error(), Some("boom".to_string()));
    }

    #[test]
    fn just_stopped_completes_stopped() {
        let cell = CellReceiver::<Never, Never>::new();
        just_stopped().connect(cell.clone()).start();
        assert!(cell.took_stopped());
    }

    #[test]
    fn read_queries_the_connecting_receivers_environment() {
        let cell = CellReceiver::<NeverStopToken, Never>::new();
        get_stop_token_sender::<EmptyEnv>()
            .connect(cell.clone())
            .start();
        assert_eq!(cell.take_value(), Some(NeverStopToken));
    }
}
