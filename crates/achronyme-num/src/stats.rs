//! Reductions over real vectors.

use achronyme_common::{EngineError, EngineErrorKind};

fn empty_input(what: &str) -> EngineError {
    EngineError::new(EngineErrorKind::Shape).with_message(format!("{what} of an empty vector"))
}

pub fn sum(xs: &[f64]) -> f64 {
    xs.iter().sum()
}

/// Arithmetic mean; `NaN` for an empty input (0/0).
pub fn mean(xs: &[f64]) -> f64 {
    sum(xs) / xs.len() as f64
}

/// Variance with `ddof` delta degrees of freedom (0 = population, the
/// default at the user surface).
pub fn var(xs: &[f64], ddof: usize) -> Result<f64, EngineError> {
    if ddof > 0 && xs.len() <= ddof {
        return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
            "ddof {ddof} requires more than {ddof} samples, got {}",
            xs.len()
        )));
    }
    if xs.is_empty() {
        return Ok(f64::NAN);
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|&x| (x - m) * (x - m)).sum();
    Ok(ss / (xs.len() - ddof) as f64)
}

/// Standard deviation; see [`var`] for the ddof contract.
pub fn std(xs: &[f64], ddof: usize) -> Result<f64, EngineError> {
    var(xs, ddof).map(f64::sqrt)
}

pub fn min(xs: &[f64]) -> Result<f64, EngineError> {
    xs.iter()
        .copied()
        .reduce(f64::min)
        .ok_or_else(|| empty_input("min"))
}

pub fn max(xs: &[f64]) -> Result<f64, EngineError> {
    xs.iter()
        .copied()
        .reduce(f64::max)
        .ok_or_else(|| empty_input("max"))
}

/// Euclidean (ℓ₂) norm.
pub fn norm(xs: &[f64]) -> f64 {
    xs.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// ℓ₁ norm.
pub fn norm_l1(xs: &[f64]) -> f64 {
    xs.iter().map(|&x| x.abs()).sum()
}

/// Inner product of equal-length vectors.
pub fn dot(a: &[f64], b: &[f64]) -> Result<f64, EngineError> {
    if a.len() != b.len() {
        return Err(EngineError::new(EngineErrorKind::Shape)
            .with_message(format!("vector lengths differ: {} vs {}", a.len(), b.len())));
    }
    Ok(a.iter().zip(b).map(|(&x, &y)| x * y).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_reductions() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(sum(&xs), 10.0);
        assert_eq!(mean(&xs), 2.5);
        assert_eq!(min(&xs).unwrap(), 1.0);
        assert_eq!(max(&xs).unwrap(), 4.0);
        assert_eq!(norm_l1(&[-1.0, 2.0]), 3.0);
        assert_eq!(norm(&[3.0, 4.0]), 5.0);
        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), 11.0);
    }

    #[test]
    fn std_population_and_sample() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std(&xs, 0).unwrap() - 2.0).abs() < 1e-12);
        assert!((var(&xs, 1).unwrap() - 32.0 / 7.0).abs() < 1e-12);
        assert!(std(&[1.0], 1).is_err());
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(sum(&[]), 0.0);
        assert!(mean(&[]).is_nan());
        assert!(std(&[], 0).unwrap().is_nan());
        assert!(min(&[]).is_err());
        assert!(max(&[]).is_err());
        assert!(dot(&[], &[1.0]).is_err());
    }
}
