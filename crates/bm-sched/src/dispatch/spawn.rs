use std::thread;

use tracing::{debug, warn};

use super::Dispatcher;
use crate::batch::Batch;
use crate::error::{Result, SchedError};
use crate::probe::TaskProbe;
use crate::stats::RunStats;

/// Creates one fresh OS thread per unit task and joins them all at the end
/// of each batch.
///
/// Threads are scoped to the batch, so no worker outlives it and the
/// operands are borrowed rather than copied.
#[derive(Debug, Clone, Default)]
pub struct SpawnPerBatch {
    stack_size: Option<usize>,
}

impl SpawnPerBatch {
    /// Creates a dispatcher with the platform default stack size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `bytes` of stack for every worker thread.
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    fn run_batch(&self, batch: Batch<'_>, probe: &dyn TaskProbe) -> Result<()> {
        let index = batch.index();

        thread::scope(|s| {
            let mut handles = Vec::with_capacity(batch.len());
            let mut failure = None;

            for task in batch.into_tasks() {
                let (row, col) = task.coords();
                let mut builder = thread::Builder::new().name(format!("bm-cell-{}-{}", row, col));
                if let Some(bytes) = self.stack_size {
                    builder = builder.stack_size(bytes);
                }

                let spawned = builder.spawn_scoped(s, move || {
                    probe.task_started(index, row, col);
                    task.run();
                    probe.task_finished(index, row, col);
                });

                match spawned {
                    Ok(handle) => handles.push((row, col, handle)),
                    Err(source) => {
                        warn!(batch = index, row, col, error = %source, "worker spawn failed");
                        failure = Some(SchedError::WorkerSpawn {
                            batch: index,
                            row,
                            col,
                            source,
                        });
                        break;
                    }
                }
            }

            // Barrier: every started worker is joined, even after a failure.
            for (row, col, handle) in handles {
                if handle.join().is_err() {
                    warn!(batch = index, row, col, "worker panicked");
                    failure.get_or_insert(SchedError::WorkerPanicked {
                        batch: index,
                        row,
                        col,
                    });
                }
            }

            match failure {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }
}

impl Dispatcher for SpawnPerBatch {
    fn name(&self) -> &str {
        "spawn"
    }

    fn execute<'env>(
        &self,
        batches: &mut dyn Iterator<Item = Batch<'env>>,
        probe: &dyn TaskProbe,
    ) -> Result<RunStats> {
        let mut stats = RunStats::default();

        for batch in batches {
            let len = batch.len();
            debug!(batch = batch.index(), workers = len, "dispatching batch");
            self.run_batch(batch, probe)?;
            stats.record_batch(len);
            stats.workers_spawned += len;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{Batches, RowMajor};
    use crate::probe::{NoopProbe, RecordingProbe};
    use crate::task::UnitTask;
    use bm_matrix::Matrix;

    #[test]
    fn test_runs_every_batch() {
        let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let b = Matrix::from_rows(&[[5, 6], [7, 8]]).unwrap();
        let mut c = Matrix::zeros(2, 2);

        let tasks = RowMajor::new(2, 2)
            .zip(c.as_mut_slice().iter_mut())
            .map(|((row, col), out)| UnitTask::new(&a, &b, out, row, col));
        let mut batches = Batches::new(tasks, 3);

        let stats = SpawnPerBatch::new().execute(&mut batches, &NoopProbe).unwrap();
        assert_eq!(stats.batches, 2);
        assert_eq!(stats.workers_spawned, 4);
        assert_eq!(stats.largest_batch, 3);
        assert_eq!(c.as_slice(), &[19, 22, 43, 50]);
    }

    #[test]
    fn test_worker_threads_are_named() {
        struct NameProbe(std::sync::Mutex<Vec<String>>);
        impl TaskProbe for NameProbe {
            fn task_started(&self, _batch: usize, _row: usize, _col: usize) {
                let name = thread::current().name().unwrap_or_default().to_string();
                self.0.lock().unwrap().push(name);
            }
        }

        let a = Matrix::from_rows(&[[1]]).unwrap();
        let b = Matrix::from_rows(&[[1]]).unwrap();
        let mut c = Matrix::zeros(1, 1);
        let tasks = RowMajor::new(1, 1)
            .zip(c.as_mut_slice().iter_mut())
            .map(|((row, col), out)| UnitTask::new(&a, &b, out, row, col));

        let probe = NameProbe(std::sync::Mutex::new(Vec::new()));
        SpawnPerBatch::new()
            .execute(&mut Batches::new(tasks, 1), &probe)
            .unwrap();
        assert_eq!(*probe.0.lock().unwrap(), vec!["bm-cell-0-0".to_string()]);
    }

    #[test]
    fn test_peak_bounded_by_batch() {
        let a = Matrix::from_vec(4, 4, vec![1; 16]).unwrap();
        let b = Matrix::from_vec(4, 4, vec![1; 16]).unwrap();
        let mut c = Matrix::zeros(4, 4);
        let tasks = RowMajor::new(4, 4)
            .zip(c.as_mut_slice().iter_mut())
            .map(|((row, col), out)| UnitTask::new(&a, &b, out, row, col));

        let probe = RecordingProbe::new();
        SpawnPerBatch::new()
            .execute(&mut Batches::new(tasks, 5), &probe)
            .unwrap();
        assert!(probe.peak_live() <= 5);
        assert_eq!(c.as_slice(), &[4; 16]);
    }
}
