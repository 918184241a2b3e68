use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vkr_exec::{then, transfer_just, CellReceiver, Connect, OperationState};
use vkr_sched::{InlineScheduler, ThreadRunLoop};

fn inline_pipeline_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("inline_pipeline");

    group.bench_function("transfer_just_then", |b| {
        b.iter(|| {
            let scheduler = InlineScheduler;
            let pipeline = then(transfer_just(scheduler, black_box(41)), |x: i32| x + 1);
            let cell = CellReceiver::new();
            pipeline.connect(cell.clone()).start();
            black_box(cell.take_value());
        })
    });

    group.finish();
}

fn thread_pool_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("thread_pool");

    group.bench_function("single_hop_round_trip", |b| {
        let pool = ThreadRunLoop::new(4);
        b.iter(|| {
            let pipeline = then(transfer_just(pool.scheduler(), black_box(41)), |x: i32| x + 1);
            let cell = CellReceiver::new();
            pipeline.connect(cell.clone()).start();
            black_box(cell.take_value());
        });
        drop(pool);
    });

    group.finish();
}

criterion_group!(benches, inline_pipeline_benchmarks, thread_pool_benchmarks);
criterion_main!(benches);
