//! `get_scheduler`/`get_delegatee_scheduler`, defined in this crate
//! rather than `vkr-env` so the default impl for `EmptyEnv` can live next
//! to the concrete scheduler it names. Rust's orphan rule requires either
//! the trait or the type in an `impl` to be local to the crate; `EmptyEnv`
//! is foreign here, so the trait has to be the local half, and that means
//! the trait can't live in `vkr-env` (where `EmptyEnv` itself is local but
//! `InlineScheduler` would be foreign) without an extra crate in between.

use vkr_core::Tag;
use vkr_env::{EmptyEnv, EnvQuery, ForwardingQuery};
use vkr_exec::Read;

use crate::inline::InlineScheduler;

/// Tag for [`GetScheduler`].
#[derive(Clone, Copy)]
pub struct GetSchedulerTag;
impl Tag for GetSchedulerTag {}
impl ForwardingQuery for GetSchedulerTag {}

/// `get_scheduler(env)`: the scheduler a sender should use when it needs
/// one and its caller hasn't specified otherwise.
pub trait GetScheduler {
    /// The scheduler type this environment hands out.
    type Scheduler: Clone;
    /// Fetches it.
    fn get_scheduler(&self) -> Self::Scheduler;
}

impl GetScheduler for EmptyEnv {
    type Scheduler = InlineScheduler;
    fn get_scheduler(&self) -> InlineScheduler {
        InlineScheduler
    }
}

/// `on(sch, S)` wraps `S`'s receiver environment in [`vkr_exec::adaptors::OnEnv`]
/// so `get_scheduler` reports the shadowing scheduler rather than falling
/// through to `Base`. The impl lives here rather than next to `OnEnv` itself
/// for the same orphan-rule reason as `GetScheduler for EmptyEnv`: the trait
/// is local to this crate, `OnEnv` is foreign, and that pairing is only legal
/// from the trait's own crate.
impl<Base, Sch: Clone + 'static> GetScheduler for vkr_exec::adaptors::OnEnv<Base, Sch> {
    type Scheduler = Sch;
    fn get_scheduler(&self) -> Sch {
        self.scheduler().clone()
    }
}

/// Tag for [`GetDelegateeScheduler`].
#[derive(Clone, Copy)]
pub struct GetDelegateeSchedulerTag;
impl Tag for GetDelegateeSchedulerTag {}
impl ForwardingQuery for GetDelegateeSchedulerTag {}

/// `get_delegatee_scheduler(env)`: the scheduler an adaptor should hand
/// work off to when it itself is only forwarding, not executing.
pub trait GetDelegateeScheduler {
    /// The scheduler type this environment delegates to.
    type Scheduler: Clone;
    /// Fetches it.
    fn get_delegatee_scheduler(&self) -> Self::Scheduler;
}

impl GetDelegateeScheduler for EmptyEnv {
    type Scheduler = InlineScheduler;
    fn get_delegatee_scheduler(&self) -> InlineScheduler {
        InlineScheduler
    }
}

/// `read(GetSchedulerQuery)`'s query: `get_scheduler(get_env(r))`. Defined
/// here rather than next to `vkr_exec::read` itself for the same orphan-rule
/// reason as [`GetScheduler`]: the query needs `GetScheduler` in scope, and
/// that trait can't live any further upstream than this crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct GetSchedulerQuery;

impl<Env: GetScheduler> EnvQuery<Env> for GetSchedulerQuery {
    type Output = Env::Scheduler;
    fn query(&self, env: &Env) -> Env::Scheduler {
        env.get_scheduler()
    }
}

/// `get_scheduler_sender()`: `read(get_scheduler)`, spelled as its own
/// factory for the common case of wanting the connecting receiver's
/// scheduler directly.
pub fn get_scheduler_sender<Env>() -> Read<GetSchedulerQuery, Env>
where
    Env: GetScheduler,
{
    vkr_exec::read(GetSchedulerQuery)
}

#[cfg(test)]
mod tests {
    use vkr_env::{HasEnv, Never};
    use vkr_exec::adaptors::OnEnv;
    use vkr_exec::testing::CellReceiver;
    use vkr_exec::{Connect, OperationState};

    use super::*;

    #[test]
    fn get_scheduler_sender_reads_the_default_inline_scheduler() {
        let cell = CellReceiver::<InlineScheduler, Never>::new();
        get_scheduler_sender::<EmptyEnv>().connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(InlineScheduler));
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct OtherScheduler;

    impl HasEnv for OtherScheduler {
        type Env = EmptyEnv;
        fn get_env(&self) -> EmptyEnv {
            EmptyEnv
        }
    }

    impl vkr_exec::Scheduler for OtherScheduler {
        type Sender = vkr_exec::Just<()>;
        fn schedule(&self) -> vkr_exec::Just<()> {
            vkr_exec::just(())
        }
    }

    /// `on` shadows `get_scheduler` with the scheduler it runs on, not the
    /// `EmptyEnv` default (`InlineScheduler`) — proven end to end through
    /// the real `GetScheduler` trait, not just the in-`vkr-exec` probe.
    #[test]
    fn on_shadows_get_scheduler_for_the_real_trait() {
        let pipeline = vkr_exec::on(
            OtherScheduler,
            get_scheduler_sender::<OnEnv<EmptyEnv, OtherScheduler>>(),
        );
        let cell = CellReceiver::<OtherScheduler, Never>::new();
        pipeline.connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(OtherScheduler));
    }
}
