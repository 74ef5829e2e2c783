//! Dense linear algebra over row-major `f64` matrices.

mod cholesky;
mod eigen;
mod lu;
mod qr;
mod svd;

pub use cholesky::cholesky;
pub use eigen::{eigen_symmetric, power_iteration, qr_eigenvalues};
pub use lu::{LuFactors, det, inverse, lu, solve};
pub use qr::qr;
pub use svd::svd;

use achronyme_common::{EngineError, EngineErrorKind, Matrix};

/// Relative pivot threshold shared by the factorizations: a pivot whose
/// magnitude falls below `PIVOT_EPS · max|A|` is treated as zero.
pub(crate) const PIVOT_EPS: f64 = 1e-12;

pub(crate) fn require_square(a: &Matrix, what: &str) -> Result<(), EngineError> {
    if !a.is_square() {
        return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
            "{what} requires a square matrix, got {}x{}",
            a.rows(),
            a.cols()
        )));
    }
    Ok(())
}

/// Symmetry up to an absolute tolerance on each mirrored pair.
pub fn is_symmetric(a: &Matrix, tol: f64) -> bool {
    if !a.is_square() {
        return false;
    }
    for i in 0..a.rows() {
        for j in 0..i {
            if (a.get(i, j) - a.get(j, i)).abs() > tol {
                return false;
            }
        }
    }
    true
}

/// Symmetric with a successful Cholesky factorization.
pub fn is_positive_definite(a: &Matrix) -> bool {
    is_symmetric(a, PIVOT_EPS * a.max_abs().max(1.0)) && cholesky(a).is_ok()
}
