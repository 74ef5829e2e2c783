//! Element-wise mathematical builtins.

use super::utils::{assemble_elements, expect_scalar, type_error};
use crate::function::{FnCaps, Function};
use crate::function_registry::register_function;
use crate::interpreter::Interpreter;
use crate::value::Value;
use achronyme_common::{Complex, EngineError, Matrix};
use achronyme_num::elementwise;
use std::sync::Arc;

/// A unary map over scalars, applied element-wise to vectors and
/// matrices. Functions with a principal-branch complex extension also
/// accept complex operands; inverse trig and rounding are real-only.
struct UnaryMathFn {
    name: &'static str,
    real: fn(f64) -> f64,
    complex: Option<fn(Complex) -> Value>,
}

impl Function for UnaryMathFn {
    fn caps(&self) -> FnCaps {
        let base = FnCaps::PURE | FnCaps::ELEMENTWISE;
        if self.complex.is_none() {
            base | FnCaps::NUMERIC_ONLY
        } else {
            base
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        match &args[0] {
            Value::Number(_) | Value::Boolean(_) => {
                let x = args[0].as_scalar().expect("scalar");
                Ok(Value::Number((self.real)(x)))
            }
            Value::Vector(xs) => Ok(Value::Vector(elementwise::map(xs, self.real))),
            Value::Matrix(m) => {
                let data = m.data().iter().map(|&x| (self.real)(x)).collect();
                Ok(Value::Matrix(Matrix::new(m.rows(), m.cols(), data)?))
            }
            Value::Complex(z) => match self.complex {
                Some(f) => Ok(f(*z)),
                None => Err(type_error(format!(
                    "{} is not defined for complex operands",
                    self.name
                ))),
            },
            Value::ComplexVector(zs) => match self.complex {
                Some(f) => {
                    let results: Vec<Value> = zs.iter().map(|&z| f(z)).collect();
                    assemble_elements(self.name, results)
                }
                None => Err(type_error(format!(
                    "{} is not defined for complex operands",
                    self.name
                ))),
            },
            other => Err(type_error(format!(
                "{} expects a numeric operand, got {}",
                self.name,
                other.type_name()
            ))),
        }
    }
}

/// Accessors into the complex plane; real operands promote with a zero
/// imaginary part.
struct ComplexAccessorFn {
    name: &'static str,
    apply: fn(Complex) -> Value,
}

impl Function for ComplexAccessorFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::ELEMENTWISE
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        match &args[0] {
            Value::Vector(xs) => {
                let results: Vec<Value> = xs
                    .iter()
                    .map(|&x| (self.apply)(Complex::from_real(x)))
                    .collect();
                assemble_elements(self.name, results)
            }
            Value::ComplexVector(zs) => {
                let results: Vec<Value> = zs.iter().map(|&z| (self.apply)(z)).collect();
                assemble_elements(self.name, results)
            }
            other => {
                let z = other.as_complex().ok_or_else(|| {
                    type_error(format!(
                        "{} expects a numeric operand, got {}",
                        self.name,
                        other.type_name()
                    ))
                })?;
                Ok((self.apply)(z))
            }
        }
    }
}

/* ─────────────────────────── atan2 ─────────────────────────── */

struct Atan2Fn;

impl Function for Atan2Fn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::ELEMENTWISE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "atan2"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        match (&args[0], &args[1]) {
            (Value::Vector(ys), Value::Vector(xs)) => Ok(Value::Vector(
                elementwise::broadcast_zip(ys, xs, f64::atan2)?,
            )),
            (Value::Vector(ys), x) => {
                let x = expect_scalar("atan2", x)?;
                Ok(Value::Vector(elementwise::map(ys, |y| y.atan2(x))))
            }
            (y, Value::Vector(xs)) => {
                let y = expect_scalar("atan2", y)?;
                Ok(Value::Vector(elementwise::map(xs, |x| y.atan2(x))))
            }
            (y, x) => {
                let y = expect_scalar("atan2", y)?;
                let x = expect_scalar("atan2", x)?;
                Ok(Value::Number(y.atan2(x)))
            }
        }
    }
}

pub fn register_builtins() {
    let unary: [UnaryMathFn; 15] = [
        UnaryMathFn {
            name: "sin",
            real: f64::sin,
            complex: Some(|z| Value::Complex(z.sin())),
        },
        UnaryMathFn {
            name: "cos",
            real: f64::cos,
            complex: Some(|z| Value::Complex(z.cos())),
        },
        UnaryMathFn {
            name: "tan",
            real: f64::tan,
            complex: Some(|z| Value::Complex(z.tan())),
        },
        UnaryMathFn {
            name: "exp",
            real: f64::exp,
            complex: Some(|z| Value::Complex(z.exp())),
        },
        UnaryMathFn {
            name: "ln",
            real: f64::ln,
            complex: Some(|z| Value::Complex(z.ln())),
        },
        UnaryMathFn {
            // Real sqrt of a negative is NaN; complex input stays on
            // the principal branch.
            name: "sqrt",
            real: f64::sqrt,
            complex: Some(|z| Value::Complex(z.sqrt())),
        },
        UnaryMathFn {
            // Magnitude for complex operands.
            name: "abs",
            real: f64::abs,
            complex: Some(|z| Value::Number(z.abs())),
        },
        UnaryMathFn {
            name: "asin",
            real: f64::asin,
            complex: None,
        },
        UnaryMathFn {
            name: "acos",
            real: f64::acos,
            complex: None,
        },
        UnaryMathFn {
            name: "atan",
            real: f64::atan,
            complex: None,
        },
        UnaryMathFn {
            name: "floor",
            real: f64::floor,
            complex: None,
        },
        UnaryMathFn {
            name: "ceil",
            real: f64::ceil,
            complex: None,
        },
        UnaryMathFn {
            name: "round",
            real: f64::round,
            complex: None,
        },
        UnaryMathFn {
            name: "sign",
            real: |x| {
                if x == 0.0 { 0.0 } else { x.signum() }
            },
            complex: None,
        },
        UnaryMathFn {
            name: "log10",
            real: f64::log10,
            complex: None,
        },
    ];
    for f in unary {
        register_function(Arc::new(f));
    }

    let accessors: [ComplexAccessorFn; 4] = [
        ComplexAccessorFn {
            name: "re",
            apply: |z| Value::Number(z.re),
        },
        ComplexAccessorFn {
            name: "im",
            apply: |z| Value::Number(z.im),
        },
        ComplexAccessorFn {
            name: "conj",
            apply: |z| Value::Complex(z.conj()),
        },
        ComplexAccessorFn {
            name: "arg",
            apply: |z| Value::Number(z.arg()),
        },
    ];
    for f in accessors {
        register_function(Arc::new(f));
    }

    register_function(Arc::new(Atan2Fn));
}
