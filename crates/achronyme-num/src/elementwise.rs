//! Element-wise kernels over contiguous `f64` buffers.

use achronyme_common::{EngineError, EngineErrorKind};

fn length_mismatch(a: usize, b: usize) -> EngineError {
    EngineError::new(EngineErrorKind::Shape)
        .with_message(format!("vector lengths differ: {a} vs {b}"))
}

/// Apply `f` to each element.
pub fn map(xs: &[f64], f: impl Fn(f64) -> f64) -> Vec<f64> {
    xs.iter().map(|&x| f(x)).collect()
}

/// Combine two equal-length slices element-wise.
pub fn zip_with(
    a: &[f64],
    b: &[f64],
    f: impl Fn(f64, f64) -> f64,
) -> Result<Vec<f64>, EngineError> {
    if a.len() != b.len() {
        return Err(length_mismatch(a.len(), b.len()));
    }
    Ok(a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
}

/// Combine element-wise, broadcasting a length-1 operand on either side.
pub fn broadcast_zip(
    a: &[f64],
    b: &[f64],
    f: impl Fn(f64, f64) -> f64,
) -> Result<Vec<f64>, EngineError> {
    match (a.len(), b.len()) {
        (x, y) if x == y => zip_with(a, b, f),
        (1, _) => Ok(b.iter().map(|&y| f(a[0], y)).collect()),
        (_, 1) => Ok(a.iter().map(|&x| f(x, b[0])).collect()),
        (x, y) => Err(length_mismatch(x, y)),
    }
}
