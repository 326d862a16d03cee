use bm_matrix::{Dims, MatrixError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error("output matrix is {got}, expected {expected}")]
    OutputShapeMismatch { expected: Dims, got: Dims },
    #[error("batch size must be at least 1")]
    InvalidBatchSize,
    #[error("failed to spawn worker for cell ({row}, {col}) in batch {batch}: {source}")]
    WorkerSpawn {
        batch: usize,
        row: usize,
        col: usize,
        source: std::io::Error,
    },
    #[error("worker for cell ({row}, {col}) in batch {batch} panicked")]
    WorkerPanicked { batch: usize, row: usize, col: usize },
    /// A pooled worker died while not running any task, so no cell can be
    /// blamed.
    #[error("pool worker exited outside a task after {completed} completed batches")]
    PoolWorkerLost { completed: usize },
}

pub type Result<T> = std::result::Result<T, SchedError>;

/// A scheduling guarantee that a recorded run failed to uphold.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProbeViolation {
    #[error("cell ({row}, {col}) was written {count} times")]
    DuplicateWrite { row: usize, col: usize, count: usize },
    #[error("cell ({row}, {col}) started but never finished")]
    Unfinished { row: usize, col: usize },
    #[error("batch {next} started a worker before batch {prev} finished")]
    BarrierCrossed { prev: usize, next: usize },
}
