use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use super::Dispatcher;
use crate::batch::Batch;
use crate::error::{Result, SchedError};
use crate::probe::TaskProbe;
use crate::stats::RunStats;
use crate::task::UnitTask;

/// A unit task tagged with the batch it belongs to.
struct Job<'env> {
    batch: usize,
    task: UnitTask<'env>,
}

/// Completion report sent back by a worker.
struct Done {
    batch: usize,
    row: usize,
    col: usize,
    panicked: bool,
}

/// Runs batches on a fixed set of worker threads fed through a channel.
///
/// The pool is created once per `execute` call and sized to the first
/// (largest) batch. After handing out a batch the controller counts one
/// completion per task before sending anything from the next batch, so the
/// batch barrier holds exactly as with fresh threads.
#[derive(Debug, Clone, Default)]
pub struct Pooled {
    stack_size: Option<usize>,
}

impl Pooled {
    /// Creates a pooled dispatcher with the platform default stack size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `bytes` of stack for every pool thread.
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }
}

fn worker_loop(jobs: Receiver<Job<'_>>, done: Sender<Done>, probe: &dyn TaskProbe) {
    for Job { batch, task } in jobs.iter() {
        let (row, col) = task.coords();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            probe.task_started(batch, row, col);
            task.run();
            probe.task_finished(batch, row, col);
        }));

        let report = Done {
            batch,
            row,
            col,
            panicked: outcome.is_err(),
        };
        if done.send(report).is_err() {
            break;
        }
    }
}

/// Hand `batch` to the pool and block until every task has reported back.
fn run_batch<'env>(
    batch: Batch<'env>,
    jobs: &Sender<Job<'env>>,
    done: &Receiver<Done>,
) -> Result<()> {
    let index = batch.index();
    let mut pending = batch.len();
    // Batch indices are consecutive from zero, so `index` batches are done.
    let lost = || {
        warn!(batch = index, "pool workers disconnected");
        SchedError::PoolWorkerLost { completed: index }
    };

    for task in batch.into_tasks() {
        if jobs.send(Job { batch: index, task }).is_err() {
            return Err(lost());
        }
    }

    let mut failure = None;
    while pending > 0 {
        match done.recv() {
            Ok(report) => {
                pending -= 1;
                if report.panicked {
                    warn!(batch = report.batch, row = report.row, col = report.col, "worker panicked");
                    failure.get_or_insert(SchedError::WorkerPanicked {
                        batch: report.batch,
                        row: report.row,
                        col: report.col,
                    });
                }
            }
            Err(_) => return Err(lost()),
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

impl Dispatcher for Pooled {
    fn name(&self) -> &str {
        "pooled"
    }

    fn execute<'env>(
        &self,
        batches: &mut dyn Iterator<Item = Batch<'env>>,
        probe: &dyn TaskProbe,
    ) -> Result<RunStats> {
        let Some(first) = batches.next() else {
            return Ok(RunStats::default());
        };
        let pool_size = first.len();

        thread::scope(|s| {
            let (job_tx, job_rx) = crossbeam_channel::bounded::<Job<'env>>(pool_size);
            let (done_tx, done_rx) = crossbeam_channel::unbounded::<Done>();

            let mut workers = Vec::with_capacity(pool_size);
            for id in 0..pool_size {
                let mut builder = thread::Builder::new().name(format!("bm-pool-{}", id));
                if let Some(bytes) = self.stack_size {
                    builder = builder.stack_size(bytes);
                }

                let jobs = job_rx.clone();
                let done = done_tx.clone();
                match builder.spawn_scoped(s, move || worker_loop(jobs, done, probe)) {
                    Ok(handle) => workers.push(handle),
                    Err(source) => {
                        let (row, col) = first.tasks()[id].coords();
                        warn!(worker = id, error = %source, "pool worker spawn failed");
                        // Closing the job channel lets already-started workers exit.
                        drop(job_tx);
                        return Err(SchedError::WorkerSpawn {
                            batch: first.index(),
                            row,
                            col,
                            source,
                        });
                    }
                }
            }
            drop(job_rx);
            drop(done_tx);
            debug!(workers = pool_size, "worker pool started");

            let mut stats = RunStats {
                workers_spawned: pool_size,
                ..RunStats::default()
            };
            let mut outcome = Ok(());
            for batch in std::iter::once(first).chain(batches) {
                let len = batch.len();
                debug!(batch = batch.index(), tasks = len, "dispatching batch");
                outcome = run_batch(batch, &job_tx, &done_rx);
                if outcome.is_err() {
                    break;
                }
                stats.record_batch(len);
            }

            drop(job_tx);
            for worker in workers {
                // Task panics are caught inside the loop; a failed join here
                // means the worker died outside a task.
                if worker.join().is_err() && outcome.is_ok() {
                    outcome = Err(SchedError::PoolWorkerLost {
                        completed: stats.batches,
                    });
                }
            }

            outcome.map(|_| stats)
        })
    }
}
