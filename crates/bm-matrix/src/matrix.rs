use crate::dims::Dims;
use crate::error::{MatrixError, Result};
use crate::random::fill_random;
use rand::Rng;
use std::fmt;

/// A dense integer matrix.
///
/// Holds contiguous, row-major `i32` data. The extents are fixed when the
/// matrix is created; the contents are mutable in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    data: Vec<i32>,
    dims: Dims,
}

impl Matrix {
    /// Create a zero-filled matrix.
    ///
    /// # Panics
    /// Panics if `rows * cols` overflows `usize`. Callers taking extents
    /// from untrusted input should check [`Dims::numel`] first.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        let dims = Dims::new(rows, cols);
        let len = dims
            .numel()
            .unwrap_or_else(|e| panic!("Matrix::zeros: {e}"));
        Matrix {
            data: vec![0; len],
            dims,
        }
    }

    /// Create a matrix from row-major data.
    ///
    /// # Errors
    /// Returns `SizeOverflow` if `rows * cols` overflows `usize` and
    /// `LengthMismatch` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<i32>) -> Result<Self> {
        if data.len() != Dims::new(rows, cols).numel()? {
            return Err(MatrixError::LengthMismatch {
                rows,
                cols,
                got: data.len(),
            });
        }
        Ok(Matrix {
            data,
            dims: Dims::new(rows, cols),
        })
    }

    /// Create a matrix from nested rows.
    ///
    /// An empty slice yields a `0x0` matrix.
    ///
    /// # Errors
    /// Returns `RaggedRows` if any row differs in length from the first.
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MatrixError::RaggedRows {
                    row: i,
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Matrix::from_vec(rows.len(), cols, data)
    }

    /// Create a matrix filled with uniform values in `FILL_MIN..=FILL_MAX`.
    ///
    /// # Panics
    /// Panics under the same condition as [`Matrix::zeros`].
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let mut m = Matrix::zeros(rows, cols);
        fill_random(&mut m, rng);
        m
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.dims.rows
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.dims.cols
    }

    /// Returns the extents of this matrix.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<i32> {
        let offset = self.dims.offset(row, col)?;
        Ok(self.data[offset])
    }

    /// Overwrite the value at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: i32) -> Result<()> {
        let offset = self.dims.offset(row, col)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Borrow row `row` as a slice.
    ///
    /// # Panics
    /// Panics if `row >= rows()`.
    pub fn row(&self, row: usize) -> &[i32] {
        let start = row * self.dims.cols;
        &self.data[start..start + self.dims.cols]
    }

    /// Iterate over rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[i32]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.dims.cols.max(1))
    }

    /// Returns a reference to the row-major data.
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    /// Returns a mutable reference to the row-major data.
    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.data
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: i32) {
        self.data.fill(value);
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix {}:", self.dims)?;
        for row in self.iter_rows() {
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
