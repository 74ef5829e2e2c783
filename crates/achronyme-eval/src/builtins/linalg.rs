//! Single-result linear-algebra builtins.
//!
//! The multi-result decompositions (`lu`, `qr`, `svd`,
//! `eigen_symmetric`, `power_iteration`) live on the fast path only —
//! the value domain has no tuple to carry them through `eval`.

use super::utils::{expect_count, expect_matrix, expect_scalar, expect_vector};
use crate::function::{FnCaps, Function};
use crate::function_registry::register_function;
use crate::interpreter::Interpreter;
use crate::value::Value;
use achronyme_common::{EngineError, Matrix};
use achronyme_num::linalg;
use std::sync::Arc;

const DEFAULT_MAX_ITER: usize = 500;
const DEFAULT_TOL: f64 = 1e-10;

/// A matrix → matrix transform.
struct MatrixFn {
    name: &'static str,
    apply: fn(&Matrix) -> Result<Matrix, EngineError>,
}

impl Function for MatrixFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let m = expect_matrix(self.name, &args[0])?;
        Ok(Value::Matrix((self.apply)(m)?))
    }
}

/// A matrix → scalar map.
struct MatrixScalarFn {
    name: &'static str,
    apply: fn(&Matrix) -> Result<f64, EngineError>,
}

impl Function for MatrixScalarFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::REDUCTION | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let m = expect_matrix(self.name, &args[0])?;
        Ok(Value::Number((self.apply)(m)?))
    }
}

/// `solve(A, b)` — LU solve of a single right-hand side.
struct SolveFn;

impl Function for SolveFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "solve"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let a = expect_matrix("solve", &args[0])?;
        let b = expect_vector("solve", &args[1])?;
        Ok(Value::Vector(linalg::solve(a, b)?))
    }
}

/// `qr_eigenvalues(A [, max_iter [, tol]])`.
struct QrEigenvaluesFn;

impl Function for QrEigenvaluesFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "qr_eigenvalues"
    }

    fn max_args(&self) -> usize {
        3
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let m = expect_matrix("qr_eigenvalues", &args[0])?;
        let max_iter = match args.get(1) {
            Some(v) => expect_count("qr_eigenvalues max_iter", v)?,
            None => DEFAULT_MAX_ITER,
        };
        let tol = match args.get(2) {
            Some(v) => expect_scalar("qr_eigenvalues tol", v)?,
            None => DEFAULT_TOL,
        };
        Ok(Value::Vector(linalg::qr_eigenvalues(m, max_iter, tol)?))
    }
}

/// `is_symmetric(A [, tol])`.
struct IsSymmetricFn;

impl Function for IsSymmetricFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "is_symmetric"
    }

    fn max_args(&self) -> usize {
        2
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let m = expect_matrix("is_symmetric", &args[0])?;
        let tol = match args.get(1) {
            Some(v) => expect_scalar("is_symmetric tol", v)?,
            None => DEFAULT_TOL,
        };
        Ok(Value::Boolean(linalg::is_symmetric(m, tol)))
    }
}

struct IsPositiveDefiniteFn;

impl Function for IsPositiveDefiniteFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "is_positive_definite"
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let m = expect_matrix("is_positive_definite", &args[0])?;
        Ok(Value::Boolean(linalg::is_positive_definite(m)))
    }
}

pub fn register_builtins() {
    register_function(Arc::new(MatrixFn {
        name: "inverse",
        apply: linalg::inverse,
    }));
    register_function(Arc::new(MatrixFn {
        name: "cholesky",
        apply: linalg::cholesky,
    }));
    register_function(Arc::new(MatrixFn {
        name: "transpose",
        apply: |m| Ok(m.transpose()),
    }));
    register_function(Arc::new(MatrixScalarFn {
        name: "det",
        apply: linalg::det,
    }));
    register_function(Arc::new(MatrixScalarFn {
        name: "trace",
        apply: |m| Ok(m.trace()),
    }));
    register_function(Arc::new(SolveFn));
    register_function(Arc::new(QrEigenvaluesFn));
    register_function(Arc::new(IsSymmetricFn));
    register_function(Arc::new(IsPositiveDefiniteFn));
}
