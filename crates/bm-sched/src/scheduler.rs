use bm_matrix::Matrix;
use tracing::{debug, warn};

use crate::batch::{Batches, RowMajor};
use crate::dispatch::{DispatchMode, Dispatcher, SpawnPerBatch};
use crate::error::{Result, SchedError};
use crate::probe::{NoopProbe, TaskProbe};
use crate::stats::RunStats;
use crate::task::UnitTask;

/// Computes `C = A @ B` one fixed-size batch of cells at a time.
#[derive(Debug)]
pub struct BatchScheduler {
    batch_size: usize,
    dispatcher: Box<dyn Dispatcher>,
}

impl BatchScheduler {
    /// Scheduler that spawns fresh threads for every batch.
    ///
    /// # Errors
    /// Returns `InvalidBatchSize` if `batch_size == 0`.
    pub fn new(batch_size: usize) -> Result<Self> {
        Self::with_dispatcher(batch_size, Box::new(SpawnPerBatch::new()))
    }

    /// Scheduler using the dispatcher selected by `mode`.
    ///
    /// # Errors
    /// Returns `InvalidBatchSize` if `batch_size == 0`.
    pub fn with_mode(batch_size: usize, mode: DispatchMode) -> Result<Self> {
        Self::with_dispatcher(batch_size, mode.dispatcher())
    }

    /// Scheduler driving a caller-supplied dispatcher.
    ///
    /// # Errors
    /// Returns `InvalidBatchSize` if `batch_size == 0`.
    pub fn with_dispatcher(batch_size: usize, dispatcher: Box<dyn Dispatcher>) -> Result<Self> {
        if batch_size == 0 {
            return Err(SchedError::InvalidBatchSize);
        }
        Ok(BatchScheduler {
            batch_size,
            dispatcher,
        })
    }

    /// Returns the maximum number of cells dispatched together.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the name of the active dispatcher.
    pub fn dispatcher_name(&self) -> &str {
        self.dispatcher.name()
    }

    /// Compute `c = a @ b`, overwriting every cell of `c`.
    pub fn multiply(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<RunStats> {
        self.multiply_with_probe(a, b, c, &NoopProbe)
    }

    /// Like [`multiply`](Self::multiply), reporting every unit task to `probe`.
    ///
    /// Shapes are checked before any worker exists: on `DimensionMismatch`
    /// or `OutputShapeMismatch` `c` is untouched. If a worker cannot be
    /// spawned or panics, `c` is reset to zero rather than left partially
    /// computed.
    pub fn multiply_with_probe(
        &self,
        a: &Matrix,
        b: &Matrix,
        c: &mut Matrix,
        probe: &dyn TaskProbe,
    ) -> Result<RunStats> {
        let out = a.dims().product_with(&b.dims())?;
        if c.dims() != out {
            return Err(SchedError::OutputShapeMismatch {
                expected: out,
                got: c.dims(),
            });
        }
        if out.is_empty() {
            debug!(dims = %out, "empty output, nothing to dispatch");
            return Ok(RunStats::default());
        }

        debug!(
            a = %a.dims(),
            b = %b.dims(),
            batch_size = self.batch_size,
            dispatcher = self.dispatcher.name(),
            "starting batched multiply"
        );

        let tasks = RowMajor::new(out.rows, out.cols)
            .zip(c.as_mut_slice().iter_mut())
            .map(|((row, col), cell)| UnitTask::new(a, b, cell, row, col));
        let mut batches = Batches::new(tasks, self.batch_size);

        match self.dispatcher.execute(&mut batches, probe) {
            Ok(stats) => {
                debug!(batches = stats.batches, workers = stats.workers_spawned, "multiply finished");
                Ok(stats)
            }
            Err(err) => {
                warn!(error = %err, "multiply aborted, clearing output");
                c.fill(0);
                Err(err)
            }
        }
    }
}

/// Compute `c = a @ b` in batches of `batch_size` freshly spawned workers.
pub fn multiply_batched(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    batch_size: usize,
) -> Result<RunStats> {
    BatchScheduler::new(batch_size)?.multiply(a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bm_matrix::MatrixError;

    fn sample() -> (Matrix, Matrix) {
        (
            Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap(),
            Matrix::from_rows(&[[5, 6], [7, 8]]).unwrap(),
        )
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(matches!(
            BatchScheduler::new(0),
            Err(SchedError::InvalidBatchSize)
        ));
    }

    #[test]
    fn test_singleton_batches() {
        let (a, b) = sample();
        let mut c = Matrix::zeros(2, 2);
        let stats = multiply_batched(&a, &b, &mut c, 1).unwrap();
        assert_eq!(c.as_slice(), &[19, 22, 43, 50]);
        assert_eq!(stats.batches, 4);
        assert_eq!(stats.workers_spawned, 4);
    }

    #[test]
    fn test_partial_last_batch() {
        let (a, b) = sample();
        let mut c = Matrix::zeros(2, 2);
        let stats = multiply_batched(&a, &b, &mut c, 3).unwrap();
        assert_eq!(c.as_slice(), &[19, 22, 43, 50]);
        assert_eq!(stats.batches, 2);
        assert_eq!(stats.cells, 4);
        assert_eq!(stats.workers_spawned, 4);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 2);
        let mut c = Matrix::from_vec(2, 2, vec![7; 4]).unwrap();
        let err = multiply_batched(&a, &b, &mut c, 2).unwrap_err();
        assert!(matches!(
            err,
            SchedError::Matrix(MatrixError::DimensionMismatch {
                rows_a: 2,
                cols_a: 3,
                rows_b: 2,
                cols_b: 2
            })
        ));
        assert_eq!(c.as_slice(), &[7; 4]);
    }

    #[test]
    fn test_output_shape_mismatch() {
        let (a, b) = sample();
        let mut c = Matrix::from_vec(2, 3, vec![7; 6]).unwrap();
        assert!(matches!(
            multiply_batched(&a, &b, &mut c, 2),
            Err(SchedError::OutputShapeMismatch { .. })
        ));
        assert_eq!(c.as_slice(), &[7; 6]);
    }

    #[test]
    fn test_pooled_mode() {
        let (a, b) = sample();
        let mut c = Matrix::zeros(2, 2);
        let scheduler = BatchScheduler::with_mode(2, DispatchMode::Pooled).unwrap();
        assert_eq!(scheduler.dispatcher_name(), "pooled");
        assert_eq!(scheduler.batch_size(), 2);

        let stats = scheduler.multiply(&a, &b, &mut c).unwrap();
        assert_eq!(c.as_slice(), &[19, 22, 43, 50]);
        assert_eq!(stats.workers_spawned, 2);
    }
}
