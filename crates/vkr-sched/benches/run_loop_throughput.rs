use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vkr_exec::{Connect, OperationState, Scheduler};
use vkr_sched::{InlineScheduler, RunLoop};

fn inline_schedule_benchmarks(c: &mut Criterion) {
    c.bench_function("inline_scheduler_schedule", |b| {
        b.iter(|| {
            let scheduler = InlineScheduler;
            black_box(scheduler.schedule());
        })
    });
}

fn run_loop_push_pop_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_loop");

    group.bench_function("push_then_pop_one", |b| {
        let run_loop = RunLoop::<()>::new();
        b.iter(|| {
            run_loop.schedule().connect(DiscardReceiver).start();
            black_box(run_loop.pop(()));
        });
    });

    group.finish();
}

struct DiscardReceiver;

impl vkr_env::HasEnv for DiscardReceiver {
    type Env = vkr_env::EmptyEnv;
    fn get_env(&self) -> vkr_env::EmptyEnv {
        vkr_env::EmptyEnv
    }
}

impl vkr_exec::Receiver for DiscardReceiver {
    type Value = ();
    type Error = vkr_env::Never;

    fn set_value(self, (): ()) {}
    fn set_error(self, _error: vkr_env::Never) {}
    fn set_stopped(self) {}
}

criterion_group!(benches, inline_schedule_benchmarks, run_loop_push_pop_benchmarks);
criterion_main!(benches);
