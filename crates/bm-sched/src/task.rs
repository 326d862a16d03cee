use bm_matrix::Matrix;

/// One output cell of `C = A @ B`.
///
/// Holds shared borrows of both operands and an exclusive borrow of the
/// single cell it writes. Because the output borrow is `&mut`, two tasks
/// can never target the same cell.
#[derive(Debug)]
pub struct UnitTask<'a> {
    a: &'a Matrix,
    b: &'a Matrix,
    out: &'a mut i32,
    row: usize,
    col: usize,
    inner: usize,
}

impl<'a> UnitTask<'a> {
    /// Create the task for cell `(row, col)`.
    ///
    /// The caller guarantees `a.cols() == b.rows()`, `row < a.rows()` and
    /// `col < b.cols()`; the scheduler checks these before building tasks.
    pub fn new(a: &'a Matrix, b: &'a Matrix, out: &'a mut i32, row: usize, col: usize) -> Self {
        UnitTask {
            a,
            b,
            out,
            row,
            col,
            inner: a.cols(),
        }
    }

    /// Returns the output row this task writes.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the output column this task writes.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Returns `(row, col)`.
    pub fn coords(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Dot product of row `row` of `A` and column `col` of `B`.
    ///
    /// Uses wrapping `i32` arithmetic: a product that overflows wraps
    /// rather than being widened.
    pub fn compute(&self) -> i32 {
        let a_row = self.a.row(self.row);
        let b = self.b.as_slice();
        let n = self.b.cols();

        (0..self.inner).fold(0i32, |sum, k| {
            sum.wrapping_add(a_row[k].wrapping_mul(b[k * n + self.col]))
        })
    }

    /// Compute the cell and write it to the output.
    pub fn run(self) {
        *self.out = self.compute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_cell() {
        let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let b = Matrix::from_rows(&[[5, 6], [7, 8]]).unwrap();
        let mut out = 0;
        let task = UnitTask::new(&a, &b, &mut out, 1, 0);
        assert_eq!(task.coords(), (1, 0));
        assert_eq!(task.compute(), 43);
        task.run();
        assert_eq!(out, 43);
    }

    #[test]
    fn test_rectangular_cell() {
        let a = Matrix::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        let b = Matrix::from_rows(&[[7, 8], [9, 10], [11, 12]]).unwrap();
        let mut out = 0;
        UnitTask::new(&a, &b, &mut out, 1, 1).run();
        assert_eq!(out, 154);
    }

    #[test]
    fn test_empty_contraction_writes_zero() {
        let a = Matrix::zeros(1, 0);
        let b = Matrix::zeros(0, 1);
        let mut out = 99;
        UnitTask::new(&a, &b, &mut out, 0, 0).run();
        assert_eq!(out, 0);
    }

    #[test]
    fn test_overflow_wraps() {
        let a = Matrix::from_rows(&[[i32::MAX, i32::MAX]]).unwrap();
        let b = Matrix::from_rows(&[[2], [1]]).unwrap();
        let mut out = 0;
        UnitTask::new(&a, &b, &mut out, 0, 0).run();
        assert_eq!(out, i32::MAX.wrapping_mul(2).wrapping_add(i32::MAX));
    }
}
