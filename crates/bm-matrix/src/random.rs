use crate::matrix::Matrix;
use rand::Rng;

/// Smallest value produced by [`fill_random`].
pub const FILL_MIN: i32 = 1;
/// Largest value produced by [`fill_random`].
pub const FILL_MAX: i32 = 5;

/// Overwrite every cell with a uniform value in `FILL_MIN..=FILL_MAX`.
///
/// Small values keep 1000x1000 products well inside `i32` range.
pub fn fill_random<R: Rng + ?Sized>(matrix: &mut Matrix, rng: &mut R) {
    for v in matrix.as_mut_slice() {
        *v = rng.gen_range(FILL_MIN..=FILL_MAX);
    }
}
