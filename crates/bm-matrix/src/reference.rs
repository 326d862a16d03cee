use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;

/// Serial triple-loop product: `c = a @ b`.
///
/// Every cell of `c` is overwritten. Accumulation uses wrapping `i32`
/// arithmetic, the same as the batched scheduler, so results agree even
/// when a dot product overflows.
///
/// # Errors
/// Returns `DimensionMismatch` if `a.cols() != b.rows()` and
/// `OutputShapeMismatch` if `c` is not `[a.rows() x b.cols()]`. `c` is left
/// untouched on error.
pub fn multiply_naive(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    let out = a.dims().product_with(&b.dims())?;
    if c.dims() != out {
        return Err(MatrixError::OutputShapeMismatch {
            expected: out,
            got: c.dims(),
        });
    }

    let (m, k, n) = (a.rows(), a.cols(), b.cols());
    let (a, b) = (a.as_slice(), b.as_slice());
    let c = c.as_mut_slice();
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0i32;
            for p in 0..k {
                sum = sum.wrapping_add(a[i * k + p].wrapping_mul(b[p * n + j]));
            }
            c[i * n + j] = sum;
        }
    }
    Ok(())
}
