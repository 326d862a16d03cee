//! `bm-sched` - Batched-parallel matrix multiplication.
//!
//! Every output cell is an independent unit task. The scheduler scans the
//! output in row-major order, groups tasks into batches of a fixed size and
//! runs each batch fully in parallel, waiting for the whole batch before the
//! next one is dispatched. At most `batch_size` workers are ever live.
//!
//! ```
//! use bm_matrix::Matrix;
//! use bm_sched::multiply_batched;
//!
//! let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
//! let b = Matrix::from_rows(&[[5, 6], [7, 8]]).unwrap();
//! let mut c = Matrix::zeros(2, 2);
//!
//! multiply_batched(&a, &b, &mut c, 3).unwrap();
//! assert_eq!(c.as_slice(), &[19, 22, 43, 50]);
//! ```

pub mod batch;
pub mod dispatch;
pub mod error;
pub mod probe;
pub mod scheduler;
pub mod stats;
pub mod task;

pub use batch::{Batch, Batches, RowMajor};
pub use dispatch::{DispatchMode, Dispatcher, Pooled, SpawnPerBatch};
pub use error::{ProbeViolation, Result, SchedError};
pub use probe::{NoopProbe, ProbeEvent, ProbeEventKind, RecordingProbe, TaskProbe};
pub use scheduler::{multiply_batched, BatchScheduler};
pub use stats::RunStats;
pub use task::UnitTask;
