//! Cholesky factorization of symmetric positive-definite matrices.

use super::require_square;
use achronyme_common::{EngineError, EngineErrorKind, Matrix};

/// Lower-triangular `L` with `A = L·Lᵀ`. Only the lower triangle of the
/// input is read; a non-positive pivot fails with `NotPositiveDefinite`.
pub fn cholesky(a: &Matrix) -> Result<Matrix, EngineError> {
    require_square(a, "cholesky")?;
    let n = a.rows();
    let mut l = Matrix::zeros(n, n);

    for i in 0..n {
        for j in 0..=i {
            let mut s = a.get(i, j);
            for k in 0..j {
                s -= l.get(i, k) * l.get(j, k);
            }
            if i == j {
                if s <= 0.0 {
                    return Err(EngineError::new(EngineErrorKind::NotPositiveDefinite)
                        .with_message(format!("pivot {s:.3e} at row {i}")));
                }
                l.set(i, i, s.sqrt());
            } else {
                l.set(i, j, s / l.get(j, j));
            }
        }
    }

    Ok(l)
}
