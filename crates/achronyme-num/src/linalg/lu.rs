//! LU factorization with partial pivoting, and the solve/inverse/det
//! routines built on it.

use super::{PIVOT_EPS, require_square};
use achronyme_common::{EngineError, EngineErrorKind, Matrix};

/// `P·A = L·U` with unit-diagonal `L`. `perm[i]` is the source row of
/// `A` that lands in row `i` of the permuted system; `sign` tracks the
/// permutation parity for the determinant.
#[derive(Debug)]
pub struct LuFactors {
    pub lower: Matrix,
    pub upper: Matrix,
    pub perm: Vec<usize>,
    pub sign: f64,
}

impl LuFactors {
    /// The permutation as an explicit matrix, `P[i, perm[i]] = 1`.
    pub fn permutation_matrix(&self) -> Matrix {
        let n = self.perm.len();
        let mut p = Matrix::zeros(n, n);
        for (i, &src) in self.perm.iter().enumerate() {
            p.set(i, src, 1.0);
        }
        p
    }

    /// Solve `A·x = b` through forward then back substitution.
    pub fn solve_vec(&self, b: &[f64]) -> Result<Vec<f64>, EngineError> {
        let n = self.perm.len();
        if b.len() != n {
            return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                "right-hand side has length {}, expected {n}",
                b.len()
            )));
        }

        // y = L⁻¹ P b
        let mut y: Vec<f64> = self.perm.iter().map(|&src| b[src]).collect();
        for i in 0..n {
            for j in 0..i {
                y[i] -= self.lower.get(i, j) * y[j];
            }
        }
        // x = U⁻¹ y
        let mut x = y;
        for i in (0..n).rev() {
            for j in i + 1..n {
                x[i] -= self.upper.get(i, j) * x[j];
            }
            x[i] /= self.upper.get(i, i);
        }
        Ok(x)
    }
}

/// Factor a square matrix, pivoting on the largest magnitude in each
/// column. Fails with `SingularMatrix` when the best available pivot
/// drops below `1e-12 · max|A|`.
pub fn lu(a: &Matrix) -> Result<LuFactors, EngineError> {
    require_square(a, "lu")?;
    let n = a.rows();
    let threshold = PIVOT_EPS * a.max_abs();

    let mut upper = a.clone();
    let mut lower = Matrix::identity(n);
    let mut perm: Vec<usize> = (0..n).collect();
    let mut sign = 1.0;

    for k in 0..n {
        let mut pivot_row = k;
        let mut pivot_abs = upper.get(k, k).abs();
        for i in k + 1..n {
            let candidate = upper.get(i, k).abs();
            if candidate > pivot_abs {
                pivot_abs = candidate;
                pivot_row = i;
            }
        }
        if pivot_abs <= threshold {
            return Err(EngineError::new(EngineErrorKind::SingularMatrix).with_message(format!(
                "pivot {pivot_abs:.3e} in column {k} below threshold"
            )));
        }
        if pivot_row != k {
            for j in 0..n {
                let tmp = upper.get(k, j);
                upper.set(k, j, upper.get(pivot_row, j));
                upper.set(pivot_row, j, tmp);
            }
            for j in 0..k {
                let tmp = lower.get(k, j);
                lower.set(k, j, lower.get(pivot_row, j));
                lower.set(pivot_row, j, tmp);
            }
            perm.swap(k, pivot_row);
            sign = -sign;
        }

        let pivot = upper.get(k, k);
        for i in k + 1..n {
            let factor = upper.get(i, k) / pivot;
            lower.set(i, k, factor);
            upper.set(i, k, 0.0);
            for j in k + 1..n {
                upper.set(i, j, upper.get(i, j) - factor * upper.get(k, j));
            }
        }
    }

    Ok(LuFactors {
        lower,
        upper,
        perm,
        sign,
    })
}

/// Solve `A·x = b` for a single right-hand side.
pub fn solve(a: &Matrix, b: &[f64]) -> Result<Vec<f64>, EngineError> {
    lu(a)?.solve_vec(b)
}

/// Inverse via LU solve against the identity columns.
pub fn inverse(a: &Matrix) -> Result<Matrix, EngineError> {
    let factors = lu(a)?;
    let n = a.rows();
    let mut out = Matrix::zeros(n, n);
    let mut unit = vec![0.0; n];
    for col in 0..n {
        unit[col] = 1.0;
        let x = factors.solve_vec(&unit)?;
        for (row, &value) in x.iter().enumerate() {
            out.set(row, col, value);
        }
        unit[col] = 0.0;
    }
    Ok(out)
}

/// Determinant via LU; a singular factorization yields exactly `0`.
pub fn det(a: &Matrix) -> Result<f64, EngineError> {
    require_square(a, "det")?;
    match lu(a) {
        Ok(factors) => {
            let mut d = factors.sign;
            for i in 0..a.rows() {
                d *= factors.upper.get(i, i);
            }
            Ok(d)
        }
        Err(e) if e.kind == EngineErrorKind::SingularMatrix => Ok(0.0),
        Err(e) => Err(e),
    }
}
