//! Operator dispatch over the value domain.
//!
//! Each operator consults the pair of operand variants and applies the
//! numeric promotion rules: booleans coerce to scalars, scalars promote
//! to complex, scalars and complex broadcast over vectors, and matrices
//! combine element-wise (with `*` meaning the matrix product).

use crate::value::Value;
use achronyme_common::{Complex, EngineError, EngineErrorKind, Matrix};
use achronyme_num::elementwise;
use achronyme_parse::{BinaryOp, UnaryOp};

fn type_mismatch_bin(op: BinaryOp, a: &Value, b: &Value) -> EngineError {
    EngineError::new(EngineErrorKind::TypeMismatch).with_message(format!(
        "operator '{}' is not defined for {} and {}",
        op.symbol(),
        a.type_name(),
        b.type_name()
    ))
}

fn length_mismatch(a: usize, b: usize) -> EngineError {
    EngineError::new(EngineErrorKind::Shape)
        .with_message(format!("vector lengths differ: {a} vs {b}"))
}

fn is_scalar_like(v: &Value) -> bool {
    matches!(v, Value::Number(_) | Value::Boolean(_))
}

/* ───────────────────────── unary ───────────────────────── */

pub fn unary(op: UnaryOp, v: &Value) -> Result<Value, EngineError> {
    match op {
        UnaryOp::Neg => negate(v),
        UnaryOp::Not => Ok(Value::Boolean(!v.is_truthy()?)),
    }
}

fn negate(v: &Value) -> Result<Value, EngineError> {
    match v {
        Value::Number(n) => Ok(Value::Number(-n)),
        Value::Boolean(b) => Ok(Value::Number(if *b { -1.0 } else { 0.0 })),
        Value::Complex(z) => Ok(Value::Complex(-*z)),
        Value::Vector(xs) => Ok(Value::Vector(xs.iter().map(|&x| -x).collect())),
        Value::ComplexVector(zs) => Ok(Value::ComplexVector(zs.iter().map(|&z| -z).collect())),
        Value::Matrix(m) => {
            let data = m.data().iter().map(|&x| -x).collect();
            Ok(Value::Matrix(Matrix::new(m.rows(), m.cols(), data)?))
        }
        other => Err(EngineError::new(EngineErrorKind::TypeMismatch)
            .with_message(format!("cannot negate a {}", other.type_name()))),
    }
}

/* ───────────────────────── binary ───────────────────────── */

pub fn binary(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, EngineError> {
    match op {
        BinaryOp::Add => elementwise_op(op, a, b, |x, y| x + y, |x, y| x + y),
        BinaryOp::Sub => elementwise_op(op, a, b, |x, y| x - y, |x, y| x - y),
        BinaryOp::Mul => multiply(a, b),
        BinaryOp::Div => divide(a, b),
        BinaryOp::Rem => remainder(a, b),
        BinaryOp::Pow => power(a, b),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt
        | BinaryOp::Ge => compare(op, a, b),
        // Normally short-circuited by the interpreter; kept total for
        // direct calls.
        BinaryOp::And => Ok(Value::Boolean(a.is_truthy()? && b.is_truthy()?)),
        BinaryOp::Or => Ok(Value::Boolean(a.is_truthy()? || b.is_truthy()?)),
    }
}

/// The shared broadcast table for `+`, `-`, element-wise `*` and `/`.
fn elementwise_op(
    op: BinaryOp,
    a: &Value,
    b: &Value,
    fr: fn(f64, f64) -> f64,
    fc: fn(Complex, Complex) -> Complex,
) -> Result<Value, EngineError> {
    match (a, b) {
        // Scalar ⊕ scalar, promoting through complex when present.
        (Value::Complex(x), _) if b.as_complex().is_some() => {
            Ok(Value::Complex(fc(*x, b.as_complex().expect("checked"))))
        }
        (_, Value::Complex(y)) if a.as_complex().is_some() => {
            Ok(Value::Complex(fc(a.as_complex().expect("checked"), *y)))
        }
        (x, y) if is_scalar_like(x) && is_scalar_like(y) => Ok(Value::Number(fr(
            x.as_scalar().expect("scalar"),
            y.as_scalar().expect("scalar"),
        ))),

        // Vector ⊕ vector.
        (Value::Vector(xs), Value::Vector(ys)) => {
            Ok(Value::Vector(elementwise::zip_with(xs, ys, fr)?))
        }

        // Scalar broadcast over a real vector.
        (Value::Vector(xs), y) if is_scalar_like(y) => {
            let s = y.as_scalar().expect("scalar");
            Ok(Value::Vector(elementwise::map(xs, |x| fr(x, s))))
        }
        (x, Value::Vector(ys)) if is_scalar_like(x) => {
            let s = x.as_scalar().expect("scalar");
            Ok(Value::Vector(elementwise::map(ys, |y| fr(s, y))))
        }

        // Complex broadcast promotes the real vector.
        (Value::Vector(xs), Value::Complex(z)) => Ok(Value::ComplexVector(
            xs.iter().map(|&x| fc(Complex::from_real(x), *z)).collect(),
        )),
        (Value::Complex(z), Value::Vector(ys)) => Ok(Value::ComplexVector(
            ys.iter().map(|&y| fc(*z, Complex::from_real(y))).collect(),
        )),

        // Complex-vector pairings.
        (Value::ComplexVector(xs), Value::ComplexVector(ys)) => {
            if xs.len() != ys.len() {
                return Err(length_mismatch(xs.len(), ys.len()));
            }
            Ok(Value::ComplexVector(
                xs.iter().zip(ys).map(|(&x, &y)| fc(x, y)).collect(),
            ))
        }
        (Value::ComplexVector(xs), Value::Vector(ys)) => {
            if xs.len() != ys.len() {
                return Err(length_mismatch(xs.len(), ys.len()));
            }
            Ok(Value::ComplexVector(
                xs.iter()
                    .zip(ys)
                    .map(|(&x, &y)| fc(x, Complex::from_real(y)))
                    .collect(),
            ))
        }
        (Value::Vector(xs), Value::ComplexVector(ys)) => {
            if xs.len() != ys.len() {
                return Err(length_mismatch(xs.len(), ys.len()));
            }
            Ok(Value::ComplexVector(
                xs.iter()
                    .zip(ys)
                    .map(|(&x, &y)| fc(Complex::from_real(x), y))
                    .collect(),
            ))
        }
        (Value::ComplexVector(xs), y) if y.as_complex().is_some() => {
            let z = y.as_complex().expect("scalar-like");
            Ok(Value::ComplexVector(xs.iter().map(|&x| fc(x, z)).collect()))
        }
        (x, Value::ComplexVector(ys)) if x.as_complex().is_some() => {
            let z = x.as_complex().expect("scalar-like");
            Ok(Value::ComplexVector(ys.iter().map(|&y| fc(z, y)).collect()))
        }

        // Matrix ⊕ matrix requires identical dimensions.
        (Value::Matrix(x), Value::Matrix(y)) => {
            if x.rows() != y.rows() || x.cols() != y.cols() {
                return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                    "matrix dimensions differ: {}x{} vs {}x{}",
                    x.rows(),
                    x.cols(),
                    y.rows(),
                    y.cols()
                )));
            }
            let data = x
                .data()
                .iter()
                .zip(y.data())
                .map(|(&p, &q)| fr(p, q))
                .collect();
            Ok(Value::Matrix(Matrix::new(x.rows(), x.cols(), data)?))
        }

        // Scalar broadcast over a matrix.
        (Value::Matrix(m), y) if is_scalar_like(y) => {
            let s = y.as_scalar().expect("scalar");
            let data = m.data().iter().map(|&x| fr(x, s)).collect();
            Ok(Value::Matrix(Matrix::new(m.rows(), m.cols(), data)?))
        }
        (x, Value::Matrix(m)) if is_scalar_like(x) => {
            let s = x.as_scalar().expect("scalar");
            let data = m.data().iter().map(|&x| fr(s, x)).collect();
            Ok(Value::Matrix(Matrix::new(m.rows(), m.cols(), data)?))
        }

        _ => Err(type_mismatch_bin(op, a, b)),
    }
}

/// `*`: element-wise with broadcast, except matrix operands mean the
/// matrix product (and matrix × vector the matrix–vector product).
fn multiply(a: &Value, b: &Value) -> Result<Value, EngineError> {
    match (a, b) {
        (Value::Matrix(x), Value::Matrix(y)) => Ok(Value::Matrix(x.matmul(y)?)),
        (Value::Matrix(m), Value::Vector(xs)) => Ok(Value::Vector(m.matvec(xs)?)),
        (Value::Matrix(_), y) if is_scalar_like(y) => {
            elementwise_op(BinaryOp::Mul, a, b, |x, y| x * y, |x, y| x * y)
        }
        (x, Value::Matrix(_)) if is_scalar_like(x) => {
            elementwise_op(BinaryOp::Mul, a, b, |x, y| x * y, |x, y| x * y)
        }
        (Value::Matrix(_), _) | (_, Value::Matrix(_)) => {
            Err(type_mismatch_bin(BinaryOp::Mul, a, b))
        }
        _ => elementwise_op(BinaryOp::Mul, a, b, |x, y| x * y, |x, y| x * y),
    }
}

/// `/`: element-wise with broadcast. Scalar division follows IEEE-754
/// (`±Infinity`, `NaN`); matrix ÷ matrix is deliberately unsupported.
fn divide(a: &Value, b: &Value) -> Result<Value, EngineError> {
    match (a, b) {
        (Value::Matrix(_), y) if is_scalar_like(y) => {
            elementwise_op(BinaryOp::Div, a, b, |x, y| x / y, |x, y| x / y)
        }
        (Value::Matrix(_), _) | (_, Value::Matrix(_)) => {
            Err(type_mismatch_bin(BinaryOp::Div, a, b))
        }
        _ => elementwise_op(BinaryOp::Div, a, b, |x, y| x / y, |x, y| x / y),
    }
}

/// `%`: real remainder with the dividend's sign; complex operands are
/// rejected.
fn remainder(a: &Value, b: &Value) -> Result<Value, EngineError> {
    match (a, b) {
        (Value::Complex(_) | Value::ComplexVector(_), _)
        | (_, Value::Complex(_) | Value::ComplexVector(_)) => {
            Err(type_mismatch_bin(BinaryOp::Rem, a, b))
        }
        (Value::Matrix(_), _) | (_, Value::Matrix(_)) => {
            Err(type_mismatch_bin(BinaryOp::Rem, a, b))
        }
        _ => elementwise_op(BinaryOp::Rem, a, b, |x, y| x % y, |_, _| Complex::ZERO),
    }
}

/// `^`: right-associative power. Real ↔ real stays real (a negative
/// base with a fractional exponent is `NaN` per IEEE, not complex);
/// any complex operand routes through the principal branch.
fn power(a: &Value, b: &Value) -> Result<Value, EngineError> {
    match (a, b) {
        (Value::Matrix(_), _) | (_, Value::Matrix(_)) => {
            Err(type_mismatch_bin(BinaryOp::Pow, a, b))
        }
        (Value::Complex(x), y) if y.as_complex().is_some() => {
            Ok(Value::Complex(x.powc(y.as_complex().expect("checked"))))
        }
        (x, Value::Complex(y)) if x.as_complex().is_some() => {
            Ok(Value::Complex(x.as_complex().expect("checked").powc(*y)))
        }
        _ => elementwise_op(BinaryOp::Pow, a, b, f64::powf, |x, y| x.powc(y)),
    }
}

/// Comparisons are defined for scalar operands only. Equality is exact
/// bit equality; epsilon comparisons belong in user code.
fn compare(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, EngineError> {
    let (Some(x), Some(y)) = (a.as_scalar(), b.as_scalar()) else {
        return Err(type_mismatch_bin(op, a, b));
    };
    let result = match op {
        BinaryOp::Eq => x.to_bits() == y.to_bits(),
        BinaryOp::Ne => x.to_bits() != y.to_bits(),
        BinaryOp::Lt => x < y,
        BinaryOp::Le => x <= y,
        BinaryOp::Gt => x > y,
        BinaryOp::Ge => x >= y,
        _ => unreachable!("compare called with a non-comparison operator"),
    };
    Ok(Value::Boolean(result))
}

/* ───────────────────────── indexing ───────────────────────── */

/// `a[i]`: vectors yield scalars, complex vectors yield complex
/// scalars, matrices yield their rows.
pub fn index(target: &Value, index: &Value) -> Result<Value, EngineError> {
    let idx = index_to_usize(index)?;
    match target {
        Value::Vector(xs) => xs.get(idx).map(|&x| Value::Number(x)).ok_or_else(|| {
            EngineError::new(EngineErrorKind::Shape)
                .with_message(format!("index {idx} out of bounds for length {}", xs.len()))
        }),
        Value::ComplexVector(zs) => zs.get(idx).map(|&z| Value::Complex(z)).ok_or_else(|| {
            EngineError::new(EngineErrorKind::Shape)
                .with_message(format!("index {idx} out of bounds for length {}", zs.len()))
        }),
        Value::Matrix(m) => {
            if idx >= m.rows() {
                return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                    "row {idx} out of bounds for {} rows",
                    m.rows()
                )));
            }
            Ok(Value::Vector(m.row(idx).to_vec()))
        }
        other => Err(EngineError::new(EngineErrorKind::TypeMismatch)
            .with_message(format!("cannot index a {}", other.type_name()))),
    }
}

fn index_to_usize(v: &Value) -> Result<usize, EngineError> {
    let n = v.as_scalar().ok_or_else(|| {
        EngineError::new(EngineErrorKind::TypeMismatch)
            .with_message(format!("index must be a scalar, got {}", v.type_name()))
    })?;
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
        return Err(EngineError::new(EngineErrorKind::TypeMismatch)
            .with_message(format!("index must be a non-negative integer, got {n}")));
    }
    Ok(n as usize)
}
