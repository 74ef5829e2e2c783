//! Eigenvalue routines: power iteration, the unshifted QR algorithm
//! and a cyclic Jacobi solver for symmetric matrices.

use super::qr::qr;
use super::require_square;
use achronyme_common::{EngineError, EngineErrorKind, Matrix};

fn l2(xs: &[f64]) -> f64 {
    xs.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Dominant eigenpair `(λ, v)` by normalized power iteration.
///
/// Terminates when `|λₖ − λₖ₋₁| < tol` or after `max_iter` steps; the
/// returned vector has unit ℓ₂ norm.
pub fn power_iteration(
    a: &Matrix,
    max_iter: usize,
    tol: f64,
) -> Result<(f64, Vec<f64>), EngineError> {
    require_square(a, "power_iteration")?;
    let n = a.rows();

    let mut v = vec![1.0 / (n as f64).sqrt(); n];
    let mut lambda = 0.0;

    for _ in 0..max_iter {
        let w = a.matvec(&v)?;
        // Rayleigh quotient with the unit-norm iterate.
        let next_lambda: f64 = v.iter().zip(&w).map(|(&x, &y)| x * y).sum();
        let norm_w = l2(&w);
        if norm_w == 0.0 {
            // v is in the null space; the dominant eigenvalue along it is 0.
            return Ok((0.0, v));
        }
        for (slot, &x) in v.iter_mut().zip(&w) {
            *slot = x / norm_w;
        }
        if (next_lambda - lambda).abs() < tol {
            return Ok((next_lambda, v));
        }
        lambda = next_lambda;
    }

    Ok((lambda, v))
}

fn max_off_diagonal(m: &Matrix) -> f64 {
    let n = m.rows();
    let mut off = 0.0_f64;
    for i in 0..n {
        for j in 0..n {
            if i != j {
                off = off.max(m.get(i, j).abs());
            }
        }
    }
    off
}

/// Eigenvalues of a symmetric matrix by the unshifted QR algorithm:
/// iterate `Aₖ₊₁ = Rₖ·Qₖ` until the off-diagonal mass drops below
/// `tol`, then read the diagonal. Values are returned in descending
/// order.
pub fn qr_eigenvalues(
    a: &Matrix,
    max_iter: usize,
    tol: f64,
) -> Result<Vec<f64>, EngineError> {
    require_square(a, "qr_eigenvalues")?;
    let mut h = a.clone();

    for _ in 0..max_iter {
        if max_off_diagonal(&h) < tol {
            break;
        }
        let (q, r) = qr(&h)?;
        h = r.matmul(&q)?;
    }

    let mut values: Vec<f64> = (0..h.rows()).map(|i| h.get(i, i)).collect();
    values.sort_by(|x, y| y.total_cmp(x));
    Ok(values)
}

/// Full symmetric eigendecomposition by cyclic Jacobi rotations.
///
/// Returns `(values, vectors)` with eigenvalues descending and the
/// matching unit eigenvectors as the columns of `vectors`. `max_iter`
/// bounds the number of sweeps.
pub fn eigen_symmetric(
    a: &Matrix,
    max_iter: usize,
    tol: f64,
) -> Result<(Vec<f64>, Matrix), EngineError> {
    require_square(a, "eigen_symmetric")?;
    let n = a.rows();
    let mut m = a.clone();
    let mut vectors = Matrix::identity(n);

    for _ in 0..max_iter {
        if max_off_diagonal(&m) < tol {
            break;
        }
        for p in 0..n.saturating_sub(1) {
            for q in p + 1..n {
                let apq = m.get(p, q);
                if apq == 0.0 {
                    continue;
                }
                let app = m.get(p, p);
                let aqq = m.get(q, q);

                // sym.schur2: the rotation zeroing the (p, q) entry.
                let tau = (aqq - app) / (2.0 * apq);
                let t = if tau >= 0.0 {
                    1.0 / (tau + (1.0 + tau * tau).sqrt())
                } else {
                    1.0 / (tau - (1.0 + tau * tau).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;

                for k in 0..n {
                    if k == p || k == q {
                        continue;
                    }
                    let akp = m.get(k, p);
                    let akq = m.get(k, q);
                    m.set(k, p, c * akp - s * akq);
                    m.set(p, k, c * akp - s * akq);
                    m.set(k, q, s * akp + c * akq);
                    m.set(q, k, s * akp + c * akq);
                }
                m.set(p, p, app - t * apq);
                m.set(q, q, aqq + t * apq);
                m.set(p, q, 0.0);
                m.set(q, p, 0.0);

                for k in 0..n {
                    let vkp = vectors.get(k, p);
                    let vkq = vectors.get(k, q);
                    vectors.set(k, p, c * vkp - s * vkq);
                    vectors.set(k, q, s * vkp + c * vkq);
                }
            }
        }
    }

    // Sort eigenpairs descending by value.
    let raw: Vec<f64> = (0..n).map(|i| m.get(i, i)).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&x, &y| raw[y].total_cmp(&raw[x]));

    let values: Vec<f64> = order.iter().map(|&i| raw[i]).collect();
    let mut sorted_vectors = Matrix::zeros(n, n);
    for (dst, &src) in order.iter().enumerate() {
        for i in 0..n {
            sorted_vectors.set(i, dst, vectors.get(i, src));
        }
    }

    Ok((values, sorted_vectors))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat(n: usize, data: &[f64]) -> Matrix {
        Matrix::new(n, n, data.to_vec()).unwrap()
    }

    #[test]
    fn power_iteration_finds_dominant_pair() {
        let a = mat(2, &[2.0, 0.0, 0.0, 1.0]);
        let (lambda, v) = power_iteration(&a, 500, 1e-12).unwrap();
        assert!((lambda - 2.0).abs() < 1e-9);
        assert!((v[0].abs() - 1.0).abs() < 1e-5);
        assert!(v[1].abs() < 1e-5);
    }

    #[test]
    fn power_iteration_on_null_map() {
        let a = mat(2, &[0.0, 0.0, 0.0, 0.0]);
        let (lambda, _) = power_iteration(&a, 100, 1e-12).unwrap();
        assert_eq!(lambda, 0.0);
    }

    #[test]
    fn qr_eigenvalues_of_symmetric_matrix() {
        // Eigenvalues of [[2,1],[1,2]] are 3 and 1.
        let a = mat(2, &[2.0, 1.0, 1.0, 2.0]);
        let values = qr_eigenvalues(&a, 500, 1e-12).unwrap();
        assert!((values[0] - 3.0).abs() < 1e-8);
        assert!((values[1] - 1.0).abs() < 1e-8);
    }

    #[test]
    fn jacobi_matches_known_spectrum() {
        let a = mat(3, &[4.0, 1.0, 0.0, 1.0, 4.0, 1.0, 0.0, 1.0, 4.0]);
        let (values, vectors) = eigen_symmetric(&a, 100, 1e-12).unwrap();
        // Spectrum: 4 ± √2 and 4.
        assert!((values[0] - (4.0 + 2.0_f64.sqrt())).abs() < 1e-9);
        assert!((values[1] - 4.0).abs() < 1e-9);
        assert!((values[2] - (4.0 - 2.0_f64.sqrt())).abs() < 1e-9);

        // A·v = λ·v for each returned column.
        for j in 0..3 {
            let v: Vec<f64> = (0..3).map(|i| vectors.get(i, j)).collect();
            let av = a.matvec(&v).unwrap();
            for i in 0..3 {
                assert!((av[i] - values[j] * v[i]).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn eigenvectors_are_orthonormal() {
        let a = mat(2, &[2.0, 1.0, 1.0, 2.0]);
        let (_, vectors) = eigen_symmetric(&a, 100, 1e-12).unwrap();
        let vtv = vectors.transpose().matmul(&vectors).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((vtv.get(i, j) - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn rejects_non_square() {
        let a = Matrix::new(2, 3, vec![0.0; 6]).unwrap();
        assert!(power_iteration(&a, 10, 1e-6).is_err());
        assert!(qr_eigenvalues(&a, 10, 1e-6).is_err());
        assert!(eigen_symmetric(&a, 10, 1e-6).is_err());
    }
}
