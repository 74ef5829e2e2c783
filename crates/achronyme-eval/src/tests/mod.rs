mod interpreter;

use crate::environment::Env;
use crate::interpreter::Interpreter;
use crate::value::Value;
use achronyme_common::EngineError;
use achronyme_parse::parse_script;

/// Evaluate a `;`-separated script in a fresh prelude environment and
/// return the last value.
pub(crate) fn eval_str(source: &str) -> Result<Value, EngineError> {
    let interp = Interpreter::new();
    let env = Env::with_prelude();
    eval_in(&interp, &env, source)
}

/// Evaluate a script in an existing environment.
pub(crate) fn eval_in(
    interp: &Interpreter,
    env: &Env,
    source: &str,
) -> Result<Value, EngineError> {
    let nodes = parse_script(source)?;
    let mut last = Value::Number(f64::NAN);
    for node in &nodes {
        last = interp.evaluate(node, env)?;
    }
    Ok(last)
}

/// Evaluate and render, as the engine's slow path does.
pub(crate) fn eval_to_string(source: &str) -> Result<String, EngineError> {
    eval_str(source).map(|v| v.format())
}
