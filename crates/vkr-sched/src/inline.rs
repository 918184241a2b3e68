//! `InlineScheduler`: schedules onto "wherever you already are." Its
//! `schedule()` sender completes the moment it's started, on the calling
//! thread — no queue, no thread hop. The default scheduler for any
//! environment that hasn't customized `get_scheduler`.

use vkr_env::{EmptyEnv, HasEnv, Never, Signatures, StoppedNo};
use vkr_exec::{Connect, OperationState, Receiver, Scheduler, Sender};

/// Schedules inline, synchronously, on whichever thread calls `start`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InlineScheduler;

impl HasEnv for InlineScheduler {
    type Env = EmptyEnv;
    fn get_env(&self) -> EmptyEnv {
        EmptyEnv
    }
}

impl Scheduler for InlineScheduler {
    type Sender = InlineSender;

    fn schedule(&self) -> InlineSender {
        InlineSender
    }
}

/// The sender `InlineScheduler::schedule` produces.
pub struct InlineSender;

impl HasEnv for InlineSender {
    type Env = EmptyEnv;
    fn get_env(&self) -> EmptyEnv {
        EmptyEnv
    }
}

impl Sender for InlineSender {
    type Sigs = Signatures<(), Never, StoppedNo>;
}

/// The operation state produced by connecting an [`InlineSender`].
pub struct InlineOp<R> {
    receiver: R,
}

impl<R: Receiver<Value = ()>> OperationState for InlineOp<R> {
    fn start(self) {
        self.receiver.set_value(());
    }
}

impl<R: Receiver<Value = ()>> Connect<R> for InlineSender {
    type Op = InlineOp<R>;

    fn connect(self, receiver: R) -> Self::Op {
        InlineOp { receiver }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vkr_exec::CellReceiver;

    #[test]
    fn inline_scheduler_completes_synchronously() {
        let cell = CellReceiver::<(), Never>::new();
        InlineScheduler.schedule().connect(cell.clone()).start();
        assert_eq!(cell.take_value(), Some(()));
    }
}
