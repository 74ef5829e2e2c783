//! Vector and matrix generators.

use super::utils::{expect_count, expect_scalar};
use crate::function::{FnCaps, Function};
use crate::function_registry::register_function;
use crate::interpreter::Interpreter;
use crate::value::Value;
use achronyme_common::{EngineError, EngineErrorKind, Matrix};
use std::sync::Arc;

/// `linspace(a, b, n)` — `n` evenly spaced samples from `a` to `b`
/// inclusive. `n = 1` yields `[a]`, `n = 0` the empty vector.
struct LinspaceFn;

impl Function for LinspaceFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "linspace"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let a = expect_scalar("linspace", &args[0])?;
        let b = expect_scalar("linspace", &args[1])?;
        let n = expect_count("linspace", &args[2])?;
        Ok(Value::Vector(linspace(a, b, n)))
    }
}

pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => {
            let step = (b - a) / (n - 1) as f64;
            (0..n).map(|k| a + step * k as f64).collect()
        }
    }
}

struct IdentityFn;

impl Function for IdentityFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "identity"
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let n = expect_count("identity", &args[0])?;
        if n == 0 {
            return Err(EngineError::new(EngineErrorKind::Shape)
                .with_message("identity requires a positive size"));
        }
        Ok(Value::Matrix(Matrix::identity(n)))
    }
}

/// Constant vectors: `zeros(n)`, `ones(n)`.
struct FillFn {
    name: &'static str,
    value: f64,
}

impl Function for FillFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let n = expect_count(self.name, &args[0])?;
        Ok(Value::Vector(vec![self.value; n]))
    }
}

pub fn register_builtins() {
    register_function(Arc::new(LinspaceFn));
    register_function(Arc::new(IdentityFn));
    register_function(Arc::new(FillFn {
        name: "zeros",
        value: 0.0,
    }));
    register_function(Arc::new(FillFn {
        name: "ones",
        value: 1.0,
    }));
}
