use crate::error::{EngineError, EngineErrorKind};
use std::fmt;

/// Dense row-major matrix over `f64`.
///
/// Single contiguous buffer, `data.len() == rows * cols`. Dimensions are
/// positive; the engine models "empty matrices" as zero-length vectors
/// instead.
#[derive(Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Build from a row-major buffer, validating the element count.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, EngineError> {
        if rows == 0 || cols == 0 {
            return Err(EngineError::new(EngineErrorKind::Shape)
                .with_message(format!("matrix dimensions must be positive, got {rows}x{cols}")));
        }
        if data.len() != rows * cols {
            return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                "matrix buffer holds {} elements, expected {rows}x{cols} = {}",
                data.len(),
                rows * cols
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build by evaluating `f(row, col)` for every element.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Matrix { rows, cols, data }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row as a contiguous slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// The whole row-major buffer.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    pub fn transpose(&self) -> Matrix {
        Matrix::from_fn(self.cols, self.rows, |i, j| self.get(j, i))
    }

    /// Largest absolute element; the scale used by pivot thresholds.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
    }

    /// Sum of the diagonal of a square matrix.
    pub fn trace(&self) -> f64 {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).sum()
    }

    /// Dense matrix product; inner dimensions must agree.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix, EngineError> {
        if self.cols != rhs.rows {
            return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a == 0.0 {
                    continue;
                }
                for j in 0..rhs.cols {
                    out.data[i * rhs.cols + j] += a * rhs.get(k, j);
                }
            }
        }
        Ok(out)
    }

    /// Matrix–vector product; `len(x)` must equal `cols`.
    pub fn matvec(&self, x: &[f64]) -> Result<Vec<f64>, EngineError> {
        if self.cols != x.len() {
            return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                "cannot multiply {}x{} by a vector of length {}",
                self.rows,
                self.cols,
                x.len()
            )));
        }
        let mut out = vec![0.0; self.rows];
        for i in 0..self.rows {
            let row = self.row(i);
            out[i] = row.iter().zip(x).map(|(a, b)| a * b).sum();
        }
        Ok(out)
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matrix({}x{}, {:?})", self.rows, self.cols, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_buffer_length() {
        assert!(Matrix::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).is_ok());
        let err = Matrix::new(2, 2, vec![1.0]).unwrap_err();
        assert_eq!(err.kind, EngineErrorKind::Shape);
        assert!(Matrix::new(0, 3, vec![]).is_err());
    }

    #[test]
    fn row_major_indexing() {
        let m = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.get(0, 2), 3.0);
        assert_eq!(m.get(1, 0), 4.0);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn matmul_and_transpose() {
        let a = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = a.transpose();
        assert_eq!(b.rows(), 3);
        let p = a.matmul(&b).unwrap();
        assert_eq!(p.get(0, 0), 14.0);
        assert_eq!(p.get(1, 1), 77.0);
        assert!(a.matmul(&a).is_err());
    }

    #[test]
    fn matvec_checks_length() {
        let a = Matrix::identity(3);
        assert_eq!(a.matvec(&[1.0, 2.0, 3.0]).unwrap(), vec![1.0, 2.0, 3.0]);
        assert!(a.matvec(&[1.0]).is_err());
    }
}
