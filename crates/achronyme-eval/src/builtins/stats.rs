//! Reduction builtins over real vectors.

use super::utils::{expect_count, expect_vector};
use crate::function::{FnCaps, Function};
use crate::function_registry::register_function;
use crate::interpreter::Interpreter;
use crate::value::Value;
use achronyme_common::EngineError;
use achronyme_num::stats;
use std::sync::Arc;

/// A vector → scalar reduction.
struct ReductionFn {
    name: &'static str,
    apply: fn(&[f64]) -> Result<f64, EngineError>,
}

impl Function for ReductionFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::REDUCTION | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let xs = expect_vector(self.name, &args[0])?;
        Ok(Value::Number((self.apply)(xs)?))
    }
}

/// `std(v)` / `std(v, ddof)` — population by default.
struct StdFn;

impl Function for StdFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::REDUCTION | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "std"
    }

    fn max_args(&self) -> usize {
        2
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let xs = expect_vector("std", &args[0])?;
        let ddof = match args.get(1) {
            Some(v) => expect_count("std ddof", v)?,
            None => 0,
        };
        Ok(Value::Number(stats::std(xs, ddof)?))
    }
}

/// `var(v)` / `var(v, ddof)` — same ddof contract as `std`.
struct VarFn;

impl Function for VarFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::REDUCTION | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "var"
    }

    fn max_args(&self) -> usize {
        2
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let xs = expect_vector("var", &args[0])?;
        let ddof = match args.get(1) {
            Some(v) => expect_count("var ddof", v)?,
            None => 0,
        };
        Ok(Value::Number(stats::var(xs, ddof)?))
    }
}

struct DotFn;

impl Function for DotFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::REDUCTION | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        "dot"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let a = expect_vector("dot", &args[0])?;
        let b = expect_vector("dot", &args[1])?;
        Ok(Value::Number(stats::dot(a, b)?))
    }
}

pub fn register_builtins() {
    let reductions: [ReductionFn; 6] = [
        ReductionFn {
            name: "sum",
            apply: |xs| Ok(stats::sum(xs)),
        },
        ReductionFn {
            name: "mean",
            apply: |xs| Ok(stats::mean(xs)),
        },
        ReductionFn {
            name: "min",
            apply: stats::min,
        },
        ReductionFn {
            name: "max",
            apply: stats::max,
        },
        ReductionFn {
            name: "norm",
            apply: |xs| Ok(stats::norm(xs)),
        },
        ReductionFn {
            name: "norm_l1",
            apply: |xs| Ok(stats::norm_l1(xs)),
        },
    ];
    for f in reductions {
        register_function(Arc::new(f));
    }
    register_function(Arc::new(StdFn));
    register_function(Arc::new(VarFn));
    register_function(Arc::new(DotFn));
}
