use crate::environment::Env;
use crate::function::Function;
use achronyme_common::{Complex, EngineError, EngineErrorKind, Matrix, fmt as value_fmt};
use achronyme_parse::ExprNode;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// A first-class closure: parameter list, body expression and the
/// captured defining environment (shared, not copied).
#[derive(Clone)]
pub struct LambdaValue {
    pub params: Rc<Vec<String>>,
    pub body: Rc<ExprNode>,
    pub captured: Env,
}

/// The runtime value domain.
///
/// `Boolean` is produced only by comparisons and coerces to `0`/`1` at
/// every user-visible boundary. `Builtin` and `Composed` are the
/// callable values behind builtin identifiers and `compose(…)`; both
/// render as the literal string `function`, same as lambdas.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    Complex(Complex),
    Boolean(bool),
    Vector(Vec<f64>),
    ComplexVector(Vec<Complex>),
    Matrix(Matrix),
    Lambda(LambdaValue),
    Builtin(Arc<dyn Function>),
    Composed(Rc<Vec<Value>>),
}

impl Value {
    /// Human-readable variant name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "scalar",
            Value::Complex(_) => "complex",
            Value::Boolean(_) => "boolean",
            Value::Vector(_) => "vector",
            Value::ComplexVector(_) => "complex vector",
            Value::Matrix(_) => "matrix",
            Value::Lambda(_) | Value::Builtin(_) | Value::Composed(_) => "function",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Lambda(_) | Value::Builtin(_) | Value::Composed(_)
        )
    }

    /// Scalar view: numbers as-is, booleans as `0`/`1`.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Complex view of scalar-like values.
    pub fn as_complex(&self) -> Option<Complex> {
        match self {
            Value::Complex(z) => Some(*z),
            _ => self.as_scalar().map(Complex::from_real),
        }
    }

    /// Truthiness of a condition: nonzero scalar, `true`, or a nonzero
    /// complex. Aggregates and functions have no truth value.
    pub fn is_truthy(&self) -> Result<bool, EngineError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::Number(n) => Ok(*n != 0.0),
            Value::Complex(z) => Ok(*z != Complex::ZERO),
            other => Err(EngineError::new(EngineErrorKind::TypeMismatch)
                .with_message(format!("a {} has no truth value", other.type_name()))),
        }
    }

    /// Render per the engine's stringification rules.
    pub fn format(&self) -> String {
        match self {
            Value::Number(n) => value_fmt::format_number(*n),
            Value::Complex(z) => value_fmt::format_complex(*z),
            Value::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Vector(xs) => value_fmt::format_vector(xs),
            Value::ComplexVector(zs) => value_fmt::format_complex_vector(zs),
            Value::Matrix(m) => value_fmt::format_matrix(m),
            Value::Lambda(_) | Value::Builtin(_) | Value::Composed(_) => "function".to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Complex(z) => write!(f, "Complex({}, {})", z.re, z.im),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Vector(xs) => write!(f, "Vector({xs:?})"),
            Value::ComplexVector(zs) => write!(f, "ComplexVector(len={})", zs.len()),
            Value::Matrix(m) => write!(f, "{m:?}"),
            Value::Lambda(l) => write!(f, "Lambda(arity={})", l.params.len()),
            Value::Builtin(b) => write!(f, "Builtin({})", b.name()),
            Value::Composed(fs) => write!(f, "Composed(len={})", fs.len()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Complex(a), Value::Complex(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::ComplexVector(a), Value::ComplexVector(b)) => a == b,
            (Value::Matrix(a), Value::Matrix(b)) => a == b,
            // Function values compare by identity.
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(&a.body, &b.body),
            (Value::Builtin(a), Value::Builtin(b)) => Arc::ptr_eq(a, b),
            (Value::Composed(a), Value::Composed(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Complex> for Value {
    fn from(z: Complex) -> Self {
        Value::Complex(z)
    }
}

impl From<Vec<f64>> for Value {
    fn from(xs: Vec<f64>) -> Self {
        Value::Vector(xs)
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}
