//! `ThreadRunLoop`: a `RunLoop<()>` plus a fixed pool of worker threads
//! popping from it, a shared-queue/fixed-worker-pool shape, just
//! synchronous rather than `async`. Worker lifecycle is logged with
//! `tracing`, with a start/stop span per worker thread.

use std::thread::{self, JoinHandle};

use tracing::{info, info_span};

use crate::run_loop::RunLoop;

/// Owns a fixed pool of worker threads draining a shared [`RunLoop`].
/// Dropping it calls `finish()` and joins every worker.
pub struct ThreadRunLoop {
    run_loop: RunLoop<()>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadRunLoop {
    /// Spawns `thread_count` workers (at least one) draining a fresh run
    /// loop.
    pub fn new(thread_count: usize) -> Self {
        let run_loop = RunLoop::new();
        let workers = (0..thread_count.max(1))
            .map(|index| {
                let worker_loop = run_loop.clone();
                thread::Builder::new()
                    .name(format!("vkr-worker-{index}"))
                    .spawn(move || {
                        let span = info_span!("vkr_worker", index);
                        let _enter = span.enter();
                        info!("worker starting");
                        while worker_loop.pop(()) {}
                        info!("worker stopping");
                    })
                    .expect("failed to spawn vkr worker thread")
            })
            .collect();
        Self { run_loop, workers }
    }

    /// A handle to the scheduler backing this pool. Clones are cheap and
    /// share the same underlying queue.
    pub fn scheduler(&self) -> RunLoop<()> {
        self.run_loop.clone()
    }
}

impl Default for ThreadRunLoop {
    fn default() -> Self {
        let count = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::new(count)
    }
}

impl Drop for ThreadRunLoop {
    fn drop(&mut self) {
        self.run_loop.finish();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vkr_env::Never;
    use vkr_exec::{CellReceiver, Connect, OperationState, Scheduler};

    #[test]
    fn work_scheduled_onto_the_pool_eventually_completes() {
        let pool = ThreadRunLoop::new(2);
        let cell = CellReceiver::<(), Never>::new();
        pool.scheduler().schedule().connect(cell.clone()).start();
        drop(pool);
        assert!(cell.take_value().is_some() || cell.took_stopped());
    }
}
