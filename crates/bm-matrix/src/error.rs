use thiserror::Error;

use crate::dims::Dims;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatrixError {
    #[error("dimension mismatch: [{rows_a}x{cols_a}] @ [{rows_b}x{cols_b}]")]
    DimensionMismatch {
        rows_a: usize,
        cols_a: usize,
        rows_b: usize,
        cols_b: usize,
    },
    #[error("[{rows}x{cols}] has more cells than fit in usize")]
    SizeOverflow { rows: usize, cols: usize },
    #[error("data length {got} does not match [{rows}x{cols}]")]
    LengthMismatch { rows: usize, cols: usize, got: usize },
    #[error("ragged rows: row {row} has {got} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("output shape mismatch: expected {expected}, got {got}")]
    OutputShapeMismatch { expected: Dims, got: Dims },
    #[error("index ({row}, {col}) out of bounds for [{rows}x{cols}]")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

pub type Result<T> = std::result::Result<T, MatrixError>;
