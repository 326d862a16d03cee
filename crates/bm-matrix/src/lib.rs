//! `bm-matrix` - Dense integer matrices for batchmul.
//!
//! This crate provides:
//! - A row-major `Matrix` of `i32` with extents fixed at creation
//! - `Dims` and the multiplication compatibility rule
//! - A naive triple-loop reference product used as the correctness baseline
//! - Seeded random fill in the `1..=5` range

pub mod dims;
pub mod error;
pub mod matrix;
pub mod random;
pub mod reference;

// Re-export primary types at the crate root for convenience.
pub use dims::Dims;
pub use error::{MatrixError, Result};
pub use matrix::Matrix;
pub use random::{fill_random, FILL_MAX, FILL_MIN};
pub use reference::multiply_naive;
