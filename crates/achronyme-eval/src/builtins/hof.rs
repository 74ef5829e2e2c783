//! Higher-order builtins: `map`, `filter`, `reduce`, `pipe`, `compose`.
//!
//! These are resolved ahead of the environment by identifier lookup, so
//! they stay polymorphic over the value domain without generics.

use super::utils::{expect_callable, expect_vector, type_error};
use crate::function::{FnCaps, Function};
use crate::function_registry::register_function;
use crate::interpreter::Interpreter;
use crate::value::Value;
use achronyme_common::{EngineError, EngineErrorKind, Matrix};
use std::rc::Rc;
use std::sync::Arc;

struct MapFn;

/// Applies a function across aligned elements of one or more inputs.
///
/// `map(f, v1, …, vk)` calls `f(v1[i], …, vk[i])` for each index and
/// collects the results.
///
/// # Remarks
/// - All-vector inputs zip to the shortest length.
/// - If any input is a matrix, every input must be a matrix of the same
///   shape and the result takes that shape.
/// - `f` must accept exactly `k` arguments and return scalars.

impl Function for MapFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::HIGHER_ORDER
    }

    fn name(&self) -> &'static str {
        "map"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn variadic(&self) -> bool {
        true
    }

    fn eval(&self, args: &[Value], interp: &Interpreter) -> Result<Value, EngineError> {
        let f = expect_callable("map", &args[0])?;
        let inputs = &args[1..];

        if inputs.iter().any(|v| matches!(v, Value::Matrix(_))) {
            return self.map_matrices(f, inputs, interp);
        }

        let mut slices = Vec::with_capacity(inputs.len());
        for v in inputs {
            slices.push(expect_vector("map", v)?);
        }
        let n = slices.iter().map(|s| s.len()).min().unwrap_or(0);

        let mut out = Vec::with_capacity(n);
        for idx in 0..n {
            let call_args: Vec<Value> =
                slices.iter().map(|s| Value::Number(s[idx])).collect();
            let result = interp.call_value(f, call_args)?;
            out.push(result.as_scalar().ok_or_else(|| {
                type_error(format!(
                    "map function returned a {}, expected a scalar",
                    result.type_name()
                ))
            })?);
        }
        Ok(Value::Vector(out))
    }
}

impl MapFn {
    fn map_matrices(
        &self,
        f: &Value,
        inputs: &[Value],
        interp: &Interpreter,
    ) -> Result<Value, EngineError> {
        let mut mats: Vec<&Matrix> = Vec::with_capacity(inputs.len());
        for v in inputs {
            match v {
                Value::Matrix(m) => mats.push(m),
                other => {
                    return Err(type_error(format!(
                        "map over matrices requires all matrix inputs, got {}",
                        other.type_name()
                    )));
                }
            }
        }
        let (rows, cols) = (mats[0].rows(), mats[0].cols());
        for m in &mats {
            if m.rows() != rows || m.cols() != cols {
                return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                    "map inputs have different shapes: {}x{} vs {rows}x{cols}",
                    m.rows(),
                    m.cols()
                )));
            }
        }

        let mut data = Vec::with_capacity(rows * cols);
        for idx in 0..rows * cols {
            let call_args: Vec<Value> = mats
                .iter()
                .map(|m| Value::Number(m.data()[idx]))
                .collect();
            let result = interp.call_value(f, call_args)?;
            data.push(result.as_scalar().ok_or_else(|| {
                type_error(format!(
                    "map function returned a {}, expected a scalar",
                    result.type_name()
                ))
            })?);
        }
        Ok(Value::Matrix(Matrix::new(rows, cols, data)?))
    }
}

/// `filter(pred, v)` — keep the elements whose predicate is truthy.
struct FilterFn;

impl Function for FilterFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::HIGHER_ORDER
    }

    fn name(&self) -> &'static str {
        "filter"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn eval(&self, args: &[Value], interp: &Interpreter) -> Result<Value, EngineError> {
        let pred = expect_callable("filter", &args[0])?;
        let xs = expect_vector("filter", &args[1])?;

        let mut out = Vec::new();
        for &x in xs {
            let keep = interp.call_value(pred, vec![Value::Number(x)])?;
            if keep.is_truthy()? {
                out.push(x);
            }
        }
        Ok(Value::Vector(out))
    }
}

struct ReduceFn;

/// Left fold of a vector: `reduce(f, init, v)`.
///
/// # Remarks
/// - The accumulator starts at `init` and may change type along the
///   fold (`f` decides what it returns).
/// - An empty vector yields `init` unchanged.

impl Function for ReduceFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::HIGHER_ORDER
    }

    fn name(&self) -> &'static str {
        "reduce"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn eval(&self, args: &[Value], interp: &Interpreter) -> Result<Value, EngineError> {
        let f = expect_callable("reduce", &args[0])?;
        let xs = expect_vector("reduce", &args[2])?;

        let mut acc = args[1].clone();
        for &x in xs {
            acc = interp.call_value(f, vec![acc, Value::Number(x)])?;
        }
        Ok(acc)
    }
}

/// `pipe(x, f1, …, fk)` — thread `x` left to right.
struct PipeFn;

impl Function for PipeFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::HIGHER_ORDER
    }

    fn name(&self) -> &'static str {
        "pipe"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn variadic(&self) -> bool {
        true
    }

    fn eval(&self, args: &[Value], interp: &Interpreter) -> Result<Value, EngineError> {
        let mut acc = args[0].clone();
        for f in &args[1..] {
            expect_callable("pipe", f)?;
            acc = interp.call_value(f, vec![acc])?;
        }
        Ok(acc)
    }
}

struct ComposeFn;

/// Right-to-left composition: `compose(f1, …, fk)` is the function
/// computing `f1(f2(…fk(x)))`.
///
/// # Remarks
/// - The innermost function receives whatever arguments the composed
///   value is called with; the outer ones are applied unary.
/// - The result is a first-class function value, so it can be bound,
///   passed to `map`, or composed again.

impl Function for ComposeFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::HIGHER_ORDER
    }

    fn name(&self) -> &'static str {
        "compose"
    }

    fn variadic(&self) -> bool {
        true
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        for f in args {
            expect_callable("compose", f)?;
        }
        Ok(Value::Composed(Rc::new(args.to_vec())))
    }
}

pub fn register_builtins() {
    register_function(Arc::new(MapFn));
    register_function(Arc::new(FilterFn));
    register_function(Arc::new(ReduceFn));
    register_function(Arc::new(PipeFn));
    register_function(Arc::new(ComposeFn));
}
