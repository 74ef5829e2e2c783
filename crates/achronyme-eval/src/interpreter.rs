use crate::environment::Env;
use crate::function_registry;
use crate::ops;
use crate::value::{LambdaValue, Value};
use achronyme_common::{Complex, EngineConfig, EngineError, EngineErrorKind, Matrix};
use achronyme_parse::{BinaryOp, ExprNode};
use std::rc::Rc;

/// Tree-walking evaluator.
///
/// Stateless apart from configuration; all mutable state lives in the
/// environment chain the caller passes in.
pub struct Interpreter {
    config: EngineConfig,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        crate::builtins::ensure_registered();
        Interpreter { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /* ===================  evaluation  =================== */

    pub fn evaluate(&self, node: &ExprNode, env: &Env) -> Result<Value, EngineError> {
        match node {
            ExprNode::Number(n) => Ok(Value::Number(*n)),
            ExprNode::Imaginary(b) => Ok(Value::Complex(Complex::new(0.0, *b))),
            ExprNode::Str(_) => Err(EngineError::new(EngineErrorKind::TypeMismatch)
                .with_message("string literals have no value in the numeric domain")),
            ExprNode::Identifier(name) => self.eval_identifier(name, env),
            ExprNode::Unary { op, expr } => {
                let v = self.evaluate(expr, env)?;
                ops::unary(*op, &v)
            }
            ExprNode::Binary { op, left, right } => self.eval_binary(*op, left, right, env),
            ExprNode::Call { callee, args } => self.eval_call(callee, args, env),
            ExprNode::Index { target, index } => {
                let t = self.evaluate(target, env)?;
                let i = self.evaluate(index, env)?;
                ops::index(&t, &i)
            }
            ExprNode::Lambda { params, body } => Ok(Value::Lambda(LambdaValue {
                params: Rc::new(params.clone()),
                body: Rc::new((**body).clone()),
                captured: env.clone(),
            })),
            ExprNode::Let { name, value } => {
                let v = self.evaluate(value, env)?;
                env.bind(name, v.clone());
                Ok(v)
            }
            ExprNode::VectorLit(elems) => self.eval_vector_literal(elems, env),
            ExprNode::MatrixLit(rows) => self.eval_matrix_literal(rows, env),
        }
    }

    /// Builtins are reserved names resolved before the environment, so
    /// `map`, `sin`, … are usable as bare values (`pipe(x, sin)`) and
    /// cannot be shadowed.
    fn eval_identifier(&self, name: &str, env: &Env) -> Result<Value, EngineError> {
        if let Some(f) = function_registry::get(name) {
            return Ok(Value::Builtin(f));
        }
        env.lookup(name).ok_or_else(|| {
            EngineError::new(EngineErrorKind::Name)
                .with_message(format!("unknown identifier '{name}'"))
        })
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: &ExprNode,
        right: &ExprNode,
        env: &Env,
    ) -> Result<Value, EngineError> {
        // `&&` and `||` evaluate the right operand only when needed.
        match op {
            BinaryOp::And => {
                let l = self.evaluate(left, env)?;
                if !l.is_truthy()? {
                    return Ok(Value::Boolean(false));
                }
                let r = self.evaluate(right, env)?;
                Ok(Value::Boolean(r.is_truthy()?))
            }
            BinaryOp::Or => {
                let l = self.evaluate(left, env)?;
                if l.is_truthy()? {
                    return Ok(Value::Boolean(true));
                }
                let r = self.evaluate(right, env)?;
                Ok(Value::Boolean(r.is_truthy()?))
            }
            _ => {
                let l = self.evaluate(left, env)?;
                let r = self.evaluate(right, env)?;
                ops::binary(op, &l, &r)
            }
        }
    }

    fn eval_call(
        &self,
        callee: &ExprNode,
        args: &[ExprNode],
        env: &Env,
    ) -> Result<Value, EngineError> {
        let f = self.evaluate(callee, env)?;
        let mut argv = Vec::with_capacity(args.len());
        for arg in args {
            argv.push(self.evaluate(arg, env)?);
        }
        self.call_value(&f, argv)
    }

    /// Invoke any callable value with already-evaluated arguments. This
    /// is the single entry point used by call expressions and by the
    /// higher-order builtins.
    pub fn call_value(&self, callee: &Value, args: Vec<Value>) -> Result<Value, EngineError> {
        match callee {
            Value::Lambda(lambda) => {
                if args.len() != lambda.params.len() {
                    return Err(EngineError::new(EngineErrorKind::Arity).with_message(format!(
                        "function expects {} argument(s), got {}",
                        lambda.params.len(),
                        args.len()
                    )));
                }
                let frame = lambda.captured.child();
                for (name, value) in lambda.params.iter().zip(args) {
                    frame.bind(name, value);
                }
                self.evaluate(&lambda.body, &frame)
            }
            Value::Builtin(f) => {
                let ok = if f.variadic() {
                    args.len() >= f.min_args()
                } else {
                    args.len() >= f.min_args() && args.len() <= f.max_args()
                };
                if !ok {
                    return Err(EngineError::new(EngineErrorKind::Arity).with_message(format!(
                        "{} expects {} argument(s), got {}",
                        f.name(),
                        describe_arity(f.min_args(), f.max_args(), f.variadic()),
                        args.len()
                    )));
                }
                f.eval(&args, self)
            }
            Value::Composed(fs) => {
                // fs = [f1, …, fk]; fk consumes the arguments, then the
                // remaining functions wrap outward.
                let (last, outer) = fs.split_last().ok_or_else(|| {
                    EngineError::new(EngineErrorKind::Arity)
                        .with_message("compose of no functions")
                })?;
                let mut acc = self.call_value(last, args)?;
                for f in outer.iter().rev() {
                    acc = self.call_value(f, vec![acc])?;
                }
                Ok(acc)
            }
            other => Err(EngineError::new(EngineErrorKind::TypeMismatch)
                .with_message(format!("a {} is not callable", other.type_name()))),
        }
    }

    /* ===================  literals  =================== */

    /// A bracket literal with non-literal rows: scalars make a vector,
    /// any complex element promotes the whole literal, and a list of
    /// equal-length vectors stacks into a matrix.
    fn eval_vector_literal(
        &self,
        elems: &[ExprNode],
        env: &Env,
    ) -> Result<Value, EngineError> {
        let mut values = Vec::with_capacity(elems.len());
        for elem in elems {
            values.push(self.evaluate(elem, env)?);
        }

        if values.iter().all(|v| matches!(v, Value::Vector(_))) && !values.is_empty() {
            return stack_rows(&values);
        }
        if values.iter().any(|v| matches!(v, Value::Complex(_))) {
            let mut out = Vec::with_capacity(values.len());
            for v in &values {
                out.push(v.as_complex().ok_or_else(|| element_error(v))?);
            }
            return Ok(Value::ComplexVector(out));
        }
        let mut out = Vec::with_capacity(values.len());
        for v in &values {
            out.push(v.as_scalar().ok_or_else(|| element_error(v))?);
        }
        Ok(Value::Vector(out))
    }

    fn eval_matrix_literal(
        &self,
        rows: &[Vec<ExprNode>],
        env: &Env,
    ) -> Result<Value, EngineError> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if cols == 0 {
            return Err(EngineError::new(EngineErrorKind::Shape)
                .with_message("matrix literal rows must be non-empty"));
        }
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                    "matrix literal row {i} has {} element(s), expected {cols}",
                    row.len()
                )));
            }
            for elem in row {
                let v = self.evaluate(elem, env)?;
                data.push(v.as_scalar().ok_or_else(|| element_error(&v))?);
            }
        }
        Ok(Value::Matrix(Matrix::new(rows.len(), cols, data)?))
    }
}

/// Stack runtime vectors of equal positive length into a matrix, one
/// vector per row.
fn stack_rows(values: &[Value]) -> Result<Value, EngineError> {
    let rows: Vec<&[f64]> = values
        .iter()
        .map(|v| match v {
            Value::Vector(xs) => xs.as_slice(),
            _ => unreachable!("caller checked all elements are vectors"),
        })
        .collect();
    let cols = rows[0].len();
    if cols == 0 {
        return Err(EngineError::new(EngineErrorKind::Shape)
            .with_message("matrix rows must be non-empty"));
    }
    let mut data = Vec::with_capacity(rows.len() * cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                "row {i} has {} element(s), expected {cols}",
                row.len()
            )));
        }
        data.extend_from_slice(row);
    }
    Ok(Value::Matrix(Matrix::new(rows.len(), cols, data)?))
}

fn element_error(v: &Value) -> EngineError {
    EngineError::new(EngineErrorKind::TypeMismatch)
        .with_message(format!("a {} cannot be an element of this literal", v.type_name()))
}

fn describe_arity(min: usize, max: usize, variadic: bool) -> String {
    if variadic {
        format!("at least {min}")
    } else if min == max {
        format!("{min}")
    } else {
        format!("{min} to {max}")
    }
}
