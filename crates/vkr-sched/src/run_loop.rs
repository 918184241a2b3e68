//! `RunLoop<Args>`: a shared, blocking queue of pending operations plus a
//! `finish` that drains whatever's left by completing it with
//! `set_stopped` rather than dropping it silently.
//!
//! Generic over `Args`, the value a worker hands to each operation it
//! pops — `ThreadRunLoop` always uses `RunLoop<()>`, but a caller with
//! per-worker context (a thread index, a scratch buffer) can pop with
//! something richer. Guarded shared state uses `parking_lot`'s
//! `Mutex`/`Condvar`.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use vkr_env::{EmptyEnv, GetStopToken, HasEnv, Never, Signatures, StoppedYes};
use vkr_core::StoppableToken;
use vkr_exec::{Connect, OperationState, Receiver, Scheduler, Sender};

use crate::err::{Result, SchedulerError};

/// A type-erased queued operation. `run` delivers `args` and executes it
/// normally; `cancel` completes it with `set_stopped` instead, used when
/// the run loop is closed before the operation gets a turn.
pub trait QueuedOp<Args>: Send {
    /// Runs the operation with `args`.
    fn run(self: Box<Self>, args: Args);
    /// Completes the operation with `set_stopped` without running it.
    fn cancel(self: Box<Self>);
}

struct Shared<Args> {
    queue: Mutex<VecDeque<Box<dyn QueuedOp<Args>>>>,
    not_empty: Condvar,
    finished: Mutex<bool>,
}

/// A shared, blocking queue of operations waiting to run.
pub struct RunLoop<Args = ()> {
    shared: Arc<Shared<Args>>,
}

impl<Args> Clone for RunLoop<Args> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<Args> PartialEq for RunLoop<Args> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<Args> Default for RunLoop<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> RunLoop<Args> {
    /// An empty, open run loop.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::new()),
                not_empty: Condvar::new(),
                finished: Mutex::new(false),
            }),
        }
    }

    /// Enqueues `op`. Once `finish()` has been called, `op` is completed
    /// with `set_stopped` immediately instead of being queued, and this
    /// returns `Err(SchedulerError::Closed)` — the caller never needs to
    /// separately cancel a pushed-but-rejected operation.
    pub fn push(&self, op: Box<dyn QueuedOp<Args>>) -> Result<()> {
        if *self.shared.finished.lock() {
            op.cancel();
            return Err(SchedulerError::Closed);
        }
        self.shared.queue.lock().push_back(op);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Blocks until an operation is available, then runs it with `args`.
    /// Returns `false` once the loop has finished and the queue has
    /// drained — a worker's own loop should stop calling `pop` then.
    pub fn pop(&self, args: Args) -> bool {
        let mut queue = self.shared.queue.lock();
        loop {
            if let Some(op) = queue.pop_front() {
                drop(queue);
                op.run(args);
                return true;
            }
            if *self.shared.finished.lock() {
                return false;
            }
            self.shared.not_empty.wait(&mut queue);
        }
    }

    /// Stops accepting new work and completes every operation still
    /// queued with `set_stopped` — the documented default for work that
    /// never got a turn, rather than dropping it without completing it.
    pub fn finish(&self) {
        *self.shared.finished.lock() = true;
        let drained: Vec<_> = self.shared.queue.lock().drain(..).collect();
        for op in drained {
            op.cancel();
        }
        self.shared.not_empty.notify_all();
    }

    /// Has `finish()` been called?
    pub fn is_finished(&self) -> bool {
        *self.shared.finished.lock()
    }
}

struct QueuedReceiver<R> {
    receiver: R,
}

impl<R> QueuedOp<()> for QueuedReceiver<R>
where
    R: Receiver<Value = ()> + Send + 'static,
    R::Env: GetStopToken,
{
    fn run(self: Box<Self>, _args: ()) {
        // Stop affinity: a receiver whose stop token is already requested
        // by the time a worker dispatches it is completed as stopped, not
        // run, even though it reached the front of the queue normally.
        if self.receiver.get_env().get_stop_token().stop_requested() {
            self.receiver.set_stopped();
        } else {
            self.receiver.set_value(());
        }
    }

    fn cancel(self: Box<Self>) {
        self.receiver.set_stopped();
    }
}

impl HasEnv for RunLoop<()> {
    type Env = EmptyEnv;
    fn get_env(&self) -> EmptyEnv {
        EmptyEnv
    }
}

impl Scheduler for RunLoop<()> {
    type Sender = RunLoopSender;

    fn schedule(&self) -> RunLoopSender {
        RunLoopSender {
            run_loop: self.clone(),
        }
    }
}

/// The sender `RunLoop::schedule` produces: completes once a worker pops
/// it off the queue, or with `set_stopped` if the loop is already
/// finished.
pub struct RunLoopSender {
    run_loop: RunLoop<()>,
}

impl HasEnv for RunLoopSender {
    type Env = EmptyEnv;
    fn get_env(&self) -> EmptyEnv {
        EmptyEnv
    }
}

impl Sender for RunLoopSender {
    type Sigs = Signatures<(), Never, StoppedYes>;
}

/// The operation state produced by connecting a [`RunLoopSender`].
pub struct RunLoopOp<R> {
    run_loop: RunLoop<()>,
    receiver: R,
}

impl<R> OperationState for RunLoopOp<R>
where
    R: Receiver<Value = ()> + Send + 'static,
    R::Env: GetStopToken,
{
    fn start(self) {
        // `push` completes the receiver with `set_stopped` itself on the
        // closed-queue path, so the `Err` here carries nothing to act on.
        let _ = self.run_loop.push(Box::new(QueuedReceiver {
            receiver: self.receiver,
        }));
    }
}

impl<R> Connect<R> for RunLoopSender
where
    R: Receiver<Value = ()> + Send + 'static,
    R::Env: GetStopToken,
{
    type Op = RunLoopOp<R>;

    fn connect(self, receiver: R) -> Self::Op {
        RunLoopOp {
            run_loop: self.run_loop,
            receiver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vkr_exec::CellReceiver;

    #[test]
    fn pushed_operation_runs_once_popped() {
        let run_loop = RunLoop::<()>::new();
        let cell = CellReceiver::<(), Never>::new();
        run_loop.schedule().connect(cell.clone()).start();
        assert!(run_loop.pop(()));
        assert_eq!(cell.take_value(), Some(()));
    }

    #[test]
    fn finish_stops_whatever_is_still_queued() {
        let run_loop = RunLoop::<()>::new();
        let cell = CellReceiver::<(), Never>::new();
        run_loop.schedule().connect(cell.clone()).start();
        run_loop.finish();
        assert!(cell.took_stopped());
        assert!(!run_loop.pop(()));
    }

    #[test]
    fn pushing_after_finish_completes_stopped_immediately() {
        let run_loop = RunLoop::<()>::new();
        run_loop.finish();
        let cell = CellReceiver::<(), Never>::new();
        run_loop.schedule().connect(cell.clone()).start();
        assert!(cell.took_stopped());
    }
}
