//! QR decomposition by Householder reflections.

use achronyme_common::{EngineError, EngineErrorKind, Matrix};

/// `A = Q·R` with orthogonal `Q` (m×m) and upper-triangular `R` (m×n).
///
/// Reflections are applied column by column; a column that is already
/// zero below the diagonal is skipped.
pub fn qr(a: &Matrix) -> Result<(Matrix, Matrix), EngineError> {
    let m = a.rows();
    let n = a.cols();
    if m == 0 || n == 0 {
        return Err(EngineError::new(EngineErrorKind::Shape)
            .with_message("qr of an empty matrix"));
    }

    let mut r = a.clone();
    let mut q = Matrix::identity(m);
    let steps = n.min(m.saturating_sub(1));

    for k in 0..steps {
        // Householder vector for the trailing part of column k.
        let norm_x: f64 = (k..m)
            .map(|i| r.get(i, k) * r.get(i, k))
            .sum::<f64>()
            .sqrt();
        if norm_x == 0.0 {
            continue;
        }
        let alpha = if r.get(k, k) > 0.0 { -norm_x } else { norm_x };
        let mut v: Vec<f64> = (k..m).map(|i| r.get(i, k)).collect();
        v[0] -= alpha;
        let v_norm_sq: f64 = v.iter().map(|&x| x * x).sum();
        if v_norm_sq == 0.0 {
            continue;
        }

        // R ← H·R on the remaining columns; column k collapses to α·e₁.
        r.set(k, k, alpha);
        for i in k + 1..m {
            r.set(i, k, 0.0);
        }
        for j in k + 1..n {
            let s: f64 = (k..m).map(|i| v[i - k] * r.get(i, j)).sum();
            let factor = 2.0 * s / v_norm_sq;
            for i in k..m {
                r.set(i, j, r.get(i, j) - factor * v[i - k]);
            }
        }

        // Q ← Q·H accumulates the product of reflections.
        for i in 0..m {
            let s: f64 = (k..m).map(|j| q.get(i, j) * v[j - k]).sum();
            let factor = 2.0 * s / v_norm_sq;
            for j in k..m {
                q.set(i, j, q.get(i, j) - factor * v[j - k]);
            }
        }
    }

    Ok((q, r))
}
