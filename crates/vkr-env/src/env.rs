//! Environments and the well-known queries senders and receivers answer.
//!
//! Queries are modeled as CPOs (singleton callables) with a documented
//! default when no customization exists. Rust has no ad hoc overload
//! resolution across crates, so each query here is its own trait with an
//! associated output type; a concrete environment opts in by implementing
//! the trait, and an adaptor environment either implements it itself
//! (shadowing, e.g. `on`'s wrapped `get_scheduler`) or forwards to its base
//! by implementing the trait generically over the base's own impl
//! (`impl<Base: GetStopToken> GetStopToken for SomeAdaptorEnv<Base>`). That
//! conditional impl *is* "forwarding query" made concrete and statically
//! checked, rather than a runtime property queried at the tag.

use std::marker::PhantomData;
use vkr_core::{NeverStopToken, StoppableToken, Tag};

/// Anything usable as an environment. Every `'static` type already
/// qualifies — the only real requirement an environment needs to meet is
/// "has no borrowed data," so it can be handed around and stored freely.
pub trait Queryable: 'static {}
impl<T: 'static> Queryable for T {}

/// Satisfies no query. The default environment for senders/receivers that
/// don't need one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmptyEnv;

/// The `get_env` CPO: every sender and receiver has one.
pub trait HasEnv {
    /// The environment type this value reports.
    type Env: Queryable;
    /// Fetches it.
    fn get_env(&self) -> Self::Env;
}

/// Marks a query as one whose answer must survive unchanged through an
/// adaptor's environment unless that adaptor deliberately shadows it (e.g.
/// `on` shadowing `get_scheduler`). Declared on the query's tag type.
pub trait ForwardingQuery: Tag {}

/// Tag for [`GetAllocator`].
#[derive(Clone, Copy)]
pub struct GetAllocatorTag;
impl Tag for GetAllocatorTag {}
impl ForwardingQuery for GetAllocatorTag {}

/// `get_allocator(env)`. This workspace has no allocator-aware senders, so
/// the "allocator" is `()`, standing in for "use the global allocator" —
/// the query still exists so adaptor environments have something concrete
/// to forward, even though nothing here allocates through it.
pub trait GetAllocator {
    /// The allocator handle type.
    type Allocator: Clone;
    /// Fetches it.
    fn get_allocator(&self) -> Self::Allocator;
}

impl GetAllocator for EmptyEnv {
    type Allocator = ();
    fn get_allocator(&self) -> Self::Allocator {}
}

/// Tag for [`GetStopToken`].
#[derive(Clone, Copy)]
pub struct GetStopTokenTag;
impl Tag for GetStopTokenTag {}
impl ForwardingQuery for GetStopTokenTag {}

/// `get_stop_token(env)`. Defaults to [`NeverStopToken`].
pub trait GetStopToken {
    /// The stop-token type this environment hands out.
    type Token: StoppableToken;
    /// Fetches it.
    fn get_stop_token(&self) -> Self::Token;
}

impl GetStopToken for EmptyEnv {
    type Token = NeverStopToken;
    fn get_stop_token(&self) -> NeverStopToken {
        NeverStopToken
    }
}

/// The query `read(Q)` applies to a receiver's environment:
/// `Q.query(get_env(r))`. A plain function could carry this, but a named
/// type lets `read` declare its `Sigs::Value` as `Q::Output` instead of the
/// placeholder `()` a closure's return type can't be spelled as.
pub trait EnvQuery<Env> {
    /// What this query extracts from the environment.
    type Output;
    /// Extracts it.
    fn query(&self, env: &Env) -> Self::Output;
}

/// `read(GetStopTokenQuery)`'s query: `get_stop_token(get_env(r))`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GetStopTokenQuery;

impl<Env: GetStopToken> EnvQuery<Env> for GetStopTokenQuery {
    type Output = Env::Token;
    fn query(&self, env: &Env) -> Env::Token {
        env.get_stop_token()
    }
}

/// `get_forward_progress_guarantee(scheduler)`. Deliberately not a
/// [`ForwardingQuery`] — schedulers answer it about themselves, not about
/// an ambient environment, so there is nothing to forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardProgressGuarantee {
    /// Workers make progress independently of one another.
    Concurrent,
    /// Workers may need to interleave to make progress.
    Parallel,
    /// No stronger guarantee than eventual completion.
    WeaklyParallel,
}

/// Tag for `get_completion_scheduler<Cpo>`: one tag per completion channel.
pub struct GetCompletionSchedulerTag<Cpo>(PhantomData<Cpo>);
impl<Cpo> Clone for GetCompletionSchedulerTag<Cpo> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<Cpo> Copy for GetCompletionSchedulerTag<Cpo> {}
impl<Cpo: 'static> Tag for GetCompletionSchedulerTag<Cpo> {}
impl<Cpo: 'static> ForwardingQuery for GetCompletionSchedulerTag<Cpo> {}

/// `get_completion_scheduler::<Cpo>(sender_env)`: the sender's completion
/// affinity for the channel `Cpo` (`SetValueTag`, `SetErrorTag`, or
/// `SetStoppedTag`, declared in `vkr-exec`).
pub trait GetCompletionScheduler<Cpo> {
    /// The scheduler type this sender completes `Cpo` on.
    type Scheduler: Clone + PartialEq;
    /// Fetches it.
    fn get_completion_scheduler(&self) -> Self::Scheduler;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_env_defaults_are_never_and_unit() {
        let env = EmptyEnv;
        assert!(!env.get_stop_token().stop_requested());
        let _: () = env.get_allocator();
    }
}
