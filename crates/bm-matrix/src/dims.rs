use crate::error::{MatrixError, Result};
use std::fmt;

/// Extents of a two-dimensional matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Dims {
    /// Creates extents of `rows x cols`. No allocation is implied, so any
    /// pair is accepted; use [`Dims::numel`] to check the cell count.
    pub fn new(rows: usize, cols: usize) -> Self {
        Dims { rows, cols }
    }

    /// Total number of cells.
    ///
    /// # Errors
    /// Returns `SizeOverflow` if `rows * cols` does not fit in `usize`.
    pub fn numel(&self) -> Result<usize> {
        self.rows
            .checked_mul(self.cols)
            .ok_or(MatrixError::SizeOverflow {
                rows: self.rows,
                cols: self.cols,
            })
    }

    /// Returns true if either extent is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Row-major offset of `(row, col)`.
    pub fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Extents of `self @ rhs`.
    ///
    /// Multiplication is only defined when `self.cols == rhs.rows`; the
    /// result is `[self.rows x rhs.cols]`.
    pub fn product_with(&self, rhs: &Dims) -> Result<Dims> {
        if self.cols != rhs.rows {
            return Err(MatrixError::DimensionMismatch {
                rows_a: self.rows,
                cols_a: self.cols,
                rows_b: rhs.rows,
                cols_b: rhs.cols,
            });
        }
        Ok(Dims::new(self.rows, rhs.cols))
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}]", self.rows, self.cols)
    }
}

impl From<(usize, usize)> for Dims {
    fn from((rows, cols): (usize, usize)) -> Self {
        Dims::new(rows, cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numel() {
        assert_eq!(Dims::new(2, 3).numel().unwrap(), 6);
        assert!(Dims::new(0, 3).is_empty());
        assert!(Dims::new(3, 0).is_empty());
        assert!(!Dims::new(1, 1).is_empty());
    }

    #[test]
    fn test_numel_overflow() {
        let d = Dims::new(usize::MAX / 2 + 1, 2);
        assert_eq!(
            d.numel(),
            Err(MatrixError::SizeOverflow {
                rows: usize::MAX / 2 + 1,
                cols: 2,
            })
        );
        // a zero extent never overflows, however large the other side
        assert_eq!(Dims::new(usize::MAX, 0).numel().unwrap(), 0);
        assert!(Dims::new(usize::MAX, 0).is_empty());
    }

    #[test]
    fn test_offset() {
        let d = Dims::new(2, 3);
        assert_eq!(d.offset(0, 0).unwrap(), 0);
        assert_eq!(d.offset(1, 2).unwrap(), 5);
        assert!(d.offset(2, 0).is_err());
        assert!(d.offset(0, 3).is_err());
    }

    #[test]
    fn test_product_with() {
        let a = Dims::new(2, 3);
        let b = Dims::new(3, 4);
        assert_eq!(a.product_with(&b).unwrap(), Dims::new(2, 4));
    }

    #[test]
    fn test_product_mismatch() {
        let a = Dims::new(2, 3);
        let b = Dims::new(2, 2);
        assert_eq!(
            a.product_with(&b),
            Err(MatrixError::DimensionMismatch {
                rows_a: 2,
                cols_a: 3,
                rows_b: 2,
                cols_b: 2,
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Dims::new(1000, 1000).to_string(), "[1000x1000]");
    }
}
