use crate::value::Value;
use achronyme_common::{Complex, EngineError, EngineErrorKind, Matrix};

pub(crate) fn type_error(msg: String) -> EngineError {
    EngineError::new(EngineErrorKind::TypeMismatch).with_message(msg)
}

pub(crate) fn expect_vector<'a>(name: &str, v: &'a Value) -> Result<&'a [f64], EngineError> {
    match v {
        Value::Vector(xs) => Ok(xs),
        other => Err(type_error(format!(
            "{name} expects a vector, got {}",
            other.type_name()
        ))),
    }
}

pub(crate) fn expect_matrix<'a>(name: &str, v: &'a Value) -> Result<&'a Matrix, EngineError> {
    match v {
        Value::Matrix(m) => Ok(m),
        other => Err(type_error(format!(
            "{name} expects a matrix, got {}",
            other.type_name()
        ))),
    }
}

pub(crate) fn expect_scalar(name: &str, v: &Value) -> Result<f64, EngineError> {
    v.as_scalar().ok_or_else(|| {
        type_error(format!("{name} expects a scalar, got {}", v.type_name()))
    })
}

/// A non-negative integer scalar (counts, sizes, iteration caps).
pub(crate) fn expect_count(name: &str, v: &Value) -> Result<usize, EngineError> {
    let n = expect_scalar(name, v)?;
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
        return Err(type_error(format!(
            "{name} expects a non-negative integer, got {n}"
        )));
    }
    Ok(n as usize)
}

pub(crate) fn expect_callable<'a>(name: &str, v: &'a Value) -> Result<&'a Value, EngineError> {
    if v.is_callable() {
        Ok(v)
    } else {
        Err(type_error(format!(
            "{name} expects a function, got {}",
            v.type_name()
        )))
    }
}

/// Real or complex input viewed as a complex buffer.
pub(crate) fn as_complex_slice(name: &str, v: &Value) -> Result<Vec<Complex>, EngineError> {
    match v {
        Value::Vector(xs) => Ok(xs.iter().map(|&x| Complex::from_real(x)).collect()),
        Value::ComplexVector(zs) => Ok(zs.clone()),
        other => Err(type_error(format!(
            "{name} expects a vector or complex vector, got {}",
            other.type_name()
        ))),
    }
}

/// Reassemble per-element results: all-real collapses to a vector,
/// otherwise everything must view as complex.
pub(crate) fn assemble_elements(name: &str, results: Vec<Value>) -> Result<Value, EngineError> {
    if results.iter().all(|v| v.as_scalar().is_some()) {
        return Ok(Value::Vector(
            results.iter().map(|v| v.as_scalar().expect("scalar")).collect(),
        ));
    }
    let mut out = Vec::with_capacity(results.len());
    for v in &results {
        out.push(v.as_complex().ok_or_else(|| {
            type_error(format!(
                "{name} produced a non-numeric element ({})",
                v.type_name()
            ))
        })?);
    }
    Ok(Value::ComplexVector(out))
}
