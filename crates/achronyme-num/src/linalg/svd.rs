//! Singular value decomposition by one-sided Jacobi rotations.

use achronyme_common::{EngineError, EngineErrorKind, Matrix};

const MAX_SWEEPS: usize = 60;
const ORTHO_TOL: f64 = 1e-14;

/// Thin SVD: `A = U·diag(S)·Vᵀ` with `U` m×n (orthonormal columns),
/// `S` non-negative in descending order, `V` n×n orthogonal.
///
/// Wide inputs are handled by decomposing the transpose and swapping
/// the factors.
pub fn svd(a: &Matrix) -> Result<(Matrix, Vec<f64>, Matrix), EngineError> {
    if a.rows() < a.cols() {
        let (u, s, v) = svd(&a.transpose())?;
        return Ok((v, s, u));
    }

    let m = a.rows();
    let n = a.cols();
    if m == 0 || n == 0 {
        return Err(EngineError::new(EngineErrorKind::Shape)
            .with_message("svd of an empty matrix"));
    }

    // Orthogonalize the columns of a working copy; V accumulates the
    // right rotations.
    let mut u = a.clone();
    let mut v = Matrix::identity(n);

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..n.saturating_sub(1) {
            for q in p + 1..n {
                let mut alpha = 0.0;
                let mut beta = 0.0;
                let mut gamma = 0.0;
                for i in 0..m {
                    let up = u.get(i, p);
                    let uq = u.get(i, q);
                    alpha += up * up;
                    beta += uq * uq;
                    gamma += up * uq;
                }
                if gamma.abs() <= ORTHO_TOL * (alpha * beta).sqrt() || gamma == 0.0 {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                for i in 0..m {
                    let up = u.get(i, p);
                    let uq = u.get(i, q);
                    u.set(i, p, c * up - s * uq);
                    u.set(i, q, s * up + c * uq);
                }
                for i in 0..n {
                    let vp = v.get(i, p);
                    let vq = v.get(i, q);
                    v.set(i, p, c * vp - s * vq);
                    v.set(i, q, s * vp + c * vq);
                }
            }
        }
        if !rotated {
            break;
        }
    }

    // Singular values are the column norms; normalize the columns of U.
    let mut order: Vec<usize> = (0..n).collect();
    let mut sigma = vec![0.0; n];
    for (j, slot) in sigma.iter_mut().enumerate() {
        *slot = (0..m).map(|i| u.get(i, j) * u.get(i, j)).sum::<f64>().sqrt();
    }
    order.sort_by(|&x, &y| sigma[y].total_cmp(&sigma[x]));

    let mut u_sorted = Matrix::zeros(m, n);
    let mut v_sorted = Matrix::zeros(n, n);
    let mut s_sorted = vec![0.0; n];
    for (dst, &src) in order.iter().enumerate() {
        let norm = sigma[src];
        s_sorted[dst] = norm;
        let inv = if norm > 0.0 { 1.0 / norm } else { 0.0 };
        for i in 0..m {
            u_sorted.set(i, dst, u.get(i, src) * inv);
        }
        for i in 0..n {
            v_sorted.set(i, dst, v.get(i, src));
        }
    }

    Ok((u_sorted, s_sorted, v_sorted))
}
