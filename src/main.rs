//! Headless demo driver for the `vkr` execution core.
//!
//! Takes two optional CLI knobs — `--workers N` and `--inline` — and runs
//! one pipeline through either a thread pool or the inline scheduler,
//! printing what it completed with. A config crate would be overkill for
//! two knobs, so this just walks `std::env::args`.

use tracing::info;
use vkr_exec::{then, transfer_just, CellReceiver, Connect, OperationState};
use vkr_sched::{InlineScheduler, ThreadRunLoop};

struct DemoConfig {
    workers: usize,
    inline: bool,
}

impl DemoConfig {
    fn from_args(args: impl Iterator<Item = String>) -> Self {
        let mut workers = 4;
        let mut inline = false;
        let mut args = args.skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--workers" => {
                    if let Some(value) = args.next() {
                        workers = value.parse().unwrap_or(workers);
                    }
                }
                "--inline" => inline = true,
                other => eprintln!("ignoring unrecognized argument: {other}"),
            }
        }
        Self { workers, inline }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = DemoConfig::from_args(std::env::args());
    info!(workers = config.workers, inline = config.inline, "starting vkr demo");

    if config.inline {
        run_on_inline();
    } else {
        run_on_pool(config.workers);
    }
}

fn run_on_inline() {
    let scheduler = InlineScheduler;
    let pipeline = then(transfer_just(scheduler, 41), |x: i32| x + 1);
    let cell = CellReceiver::new();
    pipeline.connect(cell.clone()).start();
    println!("inline result: {:?}", cell.take_value());
}

fn run_on_pool(workers: usize) {
    let pool = ThreadRunLoop::new(workers);
    let pipeline = then(transfer_just(pool.scheduler(), 41), |x: i32| x + 1);
    let cell = CellReceiver::new();
    pipeline.connect(cell.clone()).start();
    // Give the pool's workers a turn before the demo exits.
    drop(pool);
    println!(
        "pool result: {:?} (stopped: {})",
        cell.take_value(),
        cell.took_stopped()
    );
}
