//! Integration tests exercising full pipelines end to end, as opposed to
//! the adaptor-level unit tests in `vkr-exec`. Each test here wires
//! together a real scheduler (`ThreadRunLoop`/`RunLoop`) rather than the
//! inline-only senders the unit tests use.

use std::sync::{Arc, Mutex};

use vkr_core::{StopSource, StoppableToken};
use vkr_env::{GetStopToken, HasEnv};
use vkr_exec::{on, then, transfer, transfer_just, Connect, OperationState, Receiver};
use vkr_sched::{RunLoop, ThreadRunLoop};

#[test]
fn transfer_between_two_thread_pools_runs_the_second_hop_on_the_second_pool() {
    let first = ThreadRunLoop::new(3);
    let second = ThreadRunLoop::new(3);

    let second_thread_names: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = second_thread_names.clone();

    let pipeline = then(
        transfer(
            then(transfer_just(first.scheduler(), 41), |x: i32| x + 1),
            second.scheduler(),
        ),
        move |x: i32| {
            recorder
                .lock()
                .unwrap()
                .push(std::thread::current().name().unwrap_or_default().to_string());
            x * 2
        },
    );

    let cell = vkr_exec::CellReceiver::new();
    pipeline.connect(cell.clone()).start();

    drop(first);
    drop(second);

    assert_eq!(cell.take_value(), Some(84));
    let names = second_thread_names.lock().unwrap();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("vkr-worker-"));
}

/// A receiver whose environment reports a stop token that is already
/// requested, used to exercise "stop affinity": a run loop that sees a
/// requested stop token at dispatch time completes with `set_stopped`
/// rather than running the operation.
struct StoppedEnv {
    source: StopSource,
}

struct StoppingReceiver<V, E> {
    env: Arc<StoppedEnv>,
    outcome: Arc<Mutex<Outcome<V, E>>>,
}

enum Outcome<V, E> {
    Pending,
    Value(V),
    Error(E),
    Stopped,
}

impl<V, E> Clone for StoppingReceiver<V, E> {
    fn clone(&self) -> Self {
        Self {
            env: self.env.clone(),
            outcome: self.outcome.clone(),
        }
    }
}

impl<V: 'static, E: 'static> HasEnv for StoppingReceiver<V, E> {
    type Env = Arc<StoppedEnv>;
    fn get_env(&self) -> Arc<StoppedEnv> {
        self.env.clone()
    }
}

impl GetStopToken for Arc<StoppedEnv> {
    type Token = vkr_core::StopToken;
    fn get_stop_token(&self) -> vkr_core::StopToken {
        self.source.token()
    }
}

impl<V: 'static, E: 'static> Receiver for StoppingReceiver<V, E> {
    type Value = V;
    type Error = E;

    fn set_value(self, value: V) {
        *self.outcome.lock().unwrap() = Outcome::Value(value);
    }

    fn set_error(self, error: E) {
        *self.outcome.lock().unwrap() = Outcome::Error(error);
    }

    fn set_stopped(self) {
        *self.outcome.lock().unwrap() = Outcome::Stopped;
    }
}

#[test]
fn a_receiver_whose_stop_token_is_already_requested_is_completed_stopped() {
    let source = StopSource::new();
    source.request_stop();
    assert!(source.token().stop_requested());

    // A bare `RunLoop` popped by hand on this thread, rather than
    // `ThreadRunLoop`'s background workers, so the dispatch under test runs
    // deterministically instead of racing a pool's `finish()` teardown.
    let run_loop = RunLoop::<()>::new();
    let then_called = Arc::new(Mutex::new(false));
    let then_called_inner = then_called.clone();

    let pipeline = then(on(run_loop.clone(), vkr_exec::just(1)), move |x: i32| {
        *then_called_inner.lock().unwrap() = true;
        x + 1
    });

    let outcome = Arc::new(Mutex::new(Outcome::Pending));
    let receiver = StoppingReceiver {
        env: Arc::new(StoppedEnv { source }),
        outcome: outcome.clone(),
    };
    pipeline.connect(receiver).start();

    assert!(run_loop.pop(()));

    assert!(matches!(*outcome.lock().unwrap(), Outcome::Stopped));
    assert!(!*then_called.lock().unwrap());
}
