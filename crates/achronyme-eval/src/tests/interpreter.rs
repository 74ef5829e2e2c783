use super::{eval_in, eval_str, eval_to_string};
use crate::environment::Env;
use crate::interpreter::Interpreter;
use crate::value::Value;
use achronyme_common::{Complex, EngineConfig, EngineErrorKind};
use achronyme_parse::parse_script;

#[test]
fn arithmetic_precedence() {
    assert_eq!(eval_to_string("2 + 3 * 4").unwrap(), "14");
    assert_eq!(eval_to_string("(2 + 3) * 4").unwrap(), "20");
    assert_eq!(eval_to_string("2 ^ 3 ^ 2").unwrap(), "512");
    assert_eq!(eval_to_string("-2 ^ 2").unwrap(), "-4");
    assert_eq!(eval_to_string("7 % 4").unwrap(), "3");
}

#[test]
fn division_follows_ieee() {
    assert_eq!(eval_to_string("1 / 0").unwrap(), "Infinity");
    assert_eq!(eval_to_string("-1 / 0").unwrap(), "-Infinity");
    assert_eq!(eval_to_string("0 / 0").unwrap(), "NaN");
}

#[test]
fn let_binds_and_yields_the_value() {
    assert_eq!(eval_to_string("let x = 10").unwrap(), "10");
    assert_eq!(eval_to_string("let x = 10; x * x").unwrap(), "100");
    // Bare assignment is the same node.
    assert_eq!(eval_to_string("y = 4; y + 1").unwrap(), "5");
}

#[test]
fn let_binds_in_the_current_environment() {
    let interp = Interpreter::new();
    let env = Env::with_prelude();
    eval_in(&interp, &env, "let a = 2").unwrap();
    assert_eq!(env.lookup("a"), Some(Value::Number(2.0)));
}

#[test]
fn unknown_identifier_is_a_name_error() {
    let err = eval_str("nope + 1").unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::Name);
}

#[test]
fn lambdas_and_closures() {
    assert_eq!(eval_to_string("let sq = n => n ^ 2; sq(5)").unwrap(), "25");
    assert_eq!(
        eval_to_string("let add = (a, b) => a + b; add(2, 40)").unwrap(),
        "42"
    );
    // Lexical capture: the inner lambda sees `k` from its defining scope.
    assert_eq!(
        eval_to_string("let addk = k => n => n + k; let add3 = addk(3); add3(4)").unwrap(),
        "7"
    );
    // The captured environment is shared, not copied.
    assert_eq!(
        eval_to_string("let n = 1; let get = () => n; let n = 2; get()").unwrap(),
        "2"
    );
}

#[test]
fn lambda_arity_is_checked() {
    let err = eval_str("let f = (a, b) => a; f(1)").unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::Arity);
}

#[test]
fn functions_render_as_function() {
    assert_eq!(eval_to_string("n => n").unwrap(), "function");
    assert_eq!(eval_to_string("sin").unwrap(), "function");
}

#[test]
fn comparisons_and_logic() {
    assert_eq!(eval_to_string("1 < 2").unwrap(), "1");
    assert_eq!(eval_to_string("1 >= 2").unwrap(), "0");
    assert_eq!(eval_to_string("1 == 1 && 2 != 3").unwrap(), "1");
    assert_eq!(eval_to_string("0 || 1").unwrap(), "1");
}

#[test]
fn logic_short_circuits() {
    // The right operand would be a NameError if evaluated.
    assert_eq!(eval_to_string("0 && boom").unwrap(), "0");
    assert_eq!(eval_to_string("1 || boom").unwrap(), "1");
    assert_eq!(
        eval_str("1 && boom").unwrap_err().kind,
        EngineErrorKind::Name
    );
}

#[test]
fn complex_literals_and_arithmetic() {
    assert_eq!(eval_to_string("3 + 4i").unwrap(), "3 + 4i");
    assert_eq!(eval_to_string("(3 + 4i) * (3 - 4i)").unwrap(), "25");
    assert_eq!(eval_to_string("2i * 2i").unwrap(), "-4");
    assert_eq!(eval_to_string("1 - 2i").unwrap(), "1 - 2i");
    // The prelude binds `i` to the imaginary unit.
    assert_eq!(eval_to_string("i * i").unwrap(), "-1");
    assert_eq!(eval_to_string("abs(3 + 4i)").unwrap(), "5");
}

#[test]
fn sqrt_of_negative_scalar_is_nan_unless_complex() {
    assert_eq!(eval_to_string("sqrt(-4)").unwrap(), "NaN");
    assert_eq!(eval_to_string("sqrt(-4 + 0i)").unwrap(), "2i");
}

#[test]
fn vector_literals_and_ops() {
    assert_eq!(eval_to_string("[1, 2, 3]").unwrap(), "[1, 2, 3]");
    assert_eq!(eval_to_string("[]").unwrap(), "[]");
    assert_eq!(eval_to_string("[1, 2] + [10, 20]").unwrap(), "[11, 22]");
    assert_eq!(eval_to_string("[1, 2, 3] * 2").unwrap(), "[2, 4, 6]");
    assert_eq!(
        eval_str("[1, 2] + [1, 2, 3]").unwrap_err().kind,
        EngineErrorKind::Shape
    );
}

#[test]
fn complex_vector_promotion() {
    assert_eq!(
        eval_to_string("[1, 2] + 1i").unwrap(),
        "[1 + 1i, 2 + 1i]"
    );
    assert_eq!(eval_to_string("[1i, 2]").unwrap(), "[1i, 2]");
}

#[test]
fn matrix_literals_and_products() {
    assert_eq!(
        eval_to_string("[[1, 2], [3, 4]]").unwrap(),
        "[[1, 2], [3, 4]]"
    );
    assert_eq!(
        eval_to_string("[[1, 2], [3, 4]] * identity(2)").unwrap(),
        "[[1, 2], [3, 4]]"
    );
    assert_eq!(
        eval_to_string("[[1, 2], [3, 4]] * [1, 1]").unwrap(),
        "[3, 7]"
    );
    assert_eq!(
        eval_str("[[1, 2], [3]]").unwrap_err().kind,
        EngineErrorKind::Shape
    );
}

#[test]
fn runtime_vector_rows_stack_into_a_matrix() {
    assert_eq!(
        eval_to_string("let r = [1, 2]; [r, r]").unwrap(),
        "[[1, 2], [1, 2]]"
    );
    assert_eq!(
        eval_str("let r = [1, 2]; [r, [1, 2, 3]]").unwrap_err().kind,
        EngineErrorKind::Shape
    );
}

#[test]
fn indexing_values() {
    assert_eq!(eval_to_string("[10, 20, 30][1]").unwrap(), "20");
    assert_eq!(eval_to_string("[[1, 2], [3, 4]][1][0]").unwrap(), "3");
    assert_eq!(
        eval_str("[1, 2][5]").unwrap_err().kind,
        EngineErrorKind::Shape
    );
}

#[test]
fn string_literals_have_no_value() {
    let err = eval_str("\"hello\"").unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::TypeMismatch);
}

#[test]
fn matrix_division_is_rejected() {
    let err = eval_str("identity(2) / identity(2)").unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::TypeMismatch);
}

#[test]
fn builtins_are_reserved_names() {
    // A user binding cannot shadow a builtin identifier.
    assert_eq!(eval_to_string("let sin = 5; sin(0)").unwrap(), "0");
}

#[test]
fn elementwise_builtins() {
    assert_eq!(eval_to_string("sin(0)").unwrap(), "0");
    assert_eq!(eval_to_string("abs([-1, 2, -3])").unwrap(), "[1, 2, 3]");
    assert_eq!(eval_to_string("exp(0) + ln(1)").unwrap(), "1");
    assert_eq!(eval_to_string("floor(2.7) + ceil(0.2)").unwrap(), "3");
    assert_eq!(eval_to_string("atan2(1, 1) == pi / 4").unwrap(), "1");
}

#[test]
fn complex_accessors() {
    assert_eq!(eval_to_string("re(3 + 4i)").unwrap(), "3");
    assert_eq!(eval_to_string("im(3 + 4i)").unwrap(), "4");
    assert_eq!(eval_to_string("conj(3 + 4i)").unwrap(), "3 - 4i");
    assert_eq!(eval_to_string("arg(-1) == pi").unwrap(), "1");
}

#[test]
fn reductions() {
    assert_eq!(eval_to_string("sum([1, 2, 3, 4, 5])").unwrap(), "15");
    assert_eq!(eval_to_string("mean([1, 2, 3, 4])").unwrap(), "2.5");
    assert_eq!(eval_to_string("min([3, 1, 2])").unwrap(), "1");
    assert_eq!(eval_to_string("max([3, 1, 2])").unwrap(), "3");
    assert_eq!(eval_to_string("norm([3, 4])").unwrap(), "5");
    assert_eq!(eval_to_string("norm_l1([-3, 4])").unwrap(), "7");
    assert_eq!(eval_to_string("dot([1, 2], [3, 4])").unwrap(), "11");
    assert_eq!(
        eval_to_string("std([2, 4, 4, 4, 5, 5, 7, 9])").unwrap(),
        "2"
    );
}

#[test]
fn dsp_via_eval() {
    assert_eq!(
        eval_to_string("fft_mag([1, 0, 0, 0])").unwrap(),
        "[1, 1, 1, 1]"
    );
    assert_eq!(
        eval_to_string("conv([1, 2, 3], [1, 1])").unwrap(),
        "[1, 3, 5, 3]"
    );
    assert_eq!(eval_to_string("hann(1)").unwrap(), "[1]");
    // Round trip through the strict inverse.
    assert_eq!(
        eval_to_string("ifft(fft([1, 2, 3, 4]))").unwrap(),
        "[1, 2, 3, 4]"
    );
    // The transform is exact at non-power-of-two lengths too.
    let v = eval_str("fft([1, 2, 3])").unwrap();
    assert!(matches!(&v, Value::ComplexVector(zs) if zs.len() == 3));
    let v = eval_str("ifft(fft([1, 2, 3]))").unwrap();
    assert!(matches!(&v, Value::Vector(xs) if xs.len() == 3));
}

#[test]
fn relaxed_ifft_returns_complex() {
    let interp = Interpreter::with_config(EngineConfig {
        strict_ifft: false,
        ..EngineConfig::default()
    });
    let env = Env::with_prelude();
    let v = eval_in(&interp, &env, "ifft([1i, 0, 0, 0])").unwrap();
    assert!(matches!(v, Value::ComplexVector(_)));

    // The strict default rejects the same spectrum.
    let err = eval_str("ifft([1i, 0, 0, 0])").unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::NonRealResult);
}

#[test]
fn linalg_via_eval() {
    assert_eq!(eval_to_string("det([[2, 0], [0, 3]])").unwrap(), "6");
    assert_eq!(
        eval_to_string("inverse([[2, 0], [0, 4]])").unwrap(),
        "[[0.5, 0], [0, 0.25]]"
    );
    assert_eq!(
        eval_to_string("transpose([[1, 2], [3, 4]])").unwrap(),
        "[[1, 3], [2, 4]]"
    );
    assert_eq!(eval_to_string("trace([[1, 2], [3, 4]])").unwrap(), "5");
    assert_eq!(
        eval_to_string("solve([[2, 0], [0, 4]], [2, 8])").unwrap(),
        "[1, 2]"
    );
    assert_eq!(
        eval_to_string("is_symmetric([[1, 2], [2, 1]])").unwrap(),
        "1"
    );
    assert_eq!(
        eval_to_string("is_positive_definite([[1, 2], [2, 1]])").unwrap(),
        "0"
    );
    let err = eval_str("inverse([[1, 2], [2, 4]])").unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::SingularMatrix);
    let err = eval_str("cholesky([[1, 2], [2, 1]])").unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::NotPositiveDefinite);
}

#[test]
fn generators() {
    assert_eq!(eval_to_string("linspace(0, 1, 5)").unwrap(), "[0, 0.25, 0.5, 0.75, 1]");
    assert_eq!(eval_to_string("linspace(2, 5, 1)").unwrap(), "[2]");
    assert_eq!(eval_to_string("zeros(3)").unwrap(), "[0, 0, 0]");
    assert_eq!(eval_to_string("ones(2)").unwrap(), "[1, 1]");
    assert_eq!(
        eval_to_string("identity(2)").unwrap(),
        "[[1, 0], [0, 1]]"
    );
}

#[test]
fn call_arity_errors_for_builtins() {
    assert_eq!(eval_str("sin()").unwrap_err().kind, EngineErrorKind::Arity);
    assert_eq!(
        eval_str("dot([1])").unwrap_err().kind,
        EngineErrorKind::Arity
    );
}

#[test]
fn non_callable_call_is_a_type_error() {
    assert_eq!(
        eval_str("let x = 3; x(1)").unwrap_err().kind,
        EngineErrorKind::TypeMismatch
    );
}

#[test]
fn evaluation_never_partially_applies_a_script_line() {
    // A failing later statement leaves earlier bindings intact.
    let interp = Interpreter::new();
    let env = Env::with_prelude();
    let nodes = parse_script("let ok = 1; nope").unwrap();
    assert!(interp.evaluate(&nodes[0], &env).is_ok());
    assert!(interp.evaluate(&nodes[1], &env).is_err());
    assert_eq!(env.lookup("ok"), Some(Value::Number(1.0)));
}

#[test]
fn boolean_formats_as_bit() {
    assert_eq!(eval_to_string("1 == 1").unwrap(), "1");
    assert_eq!(eval_to_string("!1").unwrap(), "0");
}

#[test]
fn nested_scopes_do_not_leak() {
    let interp = Interpreter::new();
    let env = Env::with_prelude();
    eval_in(&interp, &env, "let f = x => (let t = x * 2) + 1; f(5)").unwrap();
    // `t` was bound in the call frame, not the root.
    assert_eq!(env.lookup("t"), None);
}

#[test]
fn complex_equality_is_rejected() {
    assert_eq!(
        eval_str("1i == 1i").unwrap_err().kind,
        EngineErrorKind::TypeMismatch
    );
}

#[test]
fn prelude_constants_available() {
    assert_eq!(eval_to_string("cos(pi) + 1").unwrap(), "0");
    assert_eq!(eval_to_string("tau == 2 * pi").unwrap(), "1");
}

#[test]
fn complex_value_with_zero_imaginary_formats_as_scalar() {
    assert_eq!(eval_to_string("(2 + 3i) - 3i").unwrap(), "2");
    let v = eval_str("(2 + 3i) - 3i").unwrap();
    assert_eq!(v, Value::Complex(Complex::new(2.0, 0.0)));
}
