use crate::interpreter::Interpreter;
use crate::value::Value;
use achronyme_common::EngineError;

bitflags::bitflags! {
    /// Capability flags of a builtin function.
    ///
    /// Used by the dispatcher for arity-independent decisions (and by
    /// tests to pin down contracts); most builtins are plain `PURE`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FnCaps: u8 {
        /// Same inputs, same output, no side effects.
        const PURE         = 0b0000_0001;
        /// Reduces a vector to a scalar (e.g. `sum`, `norm`).
        const REDUCTION    = 0b0000_0010;
        /// Applies element-wise over vectors (e.g. `sin`, `abs`).
        const ELEMENTWISE  = 0b0000_0100;
        /// Consumes or produces function values (e.g. `map`, `compose`).
        const HIGHER_ORDER = 0b0000_1000;
        /// Operates on real numbers only; complex operands are rejected.
        const NUMERIC_ONLY = 0b0001_0000;
    }
}

/// A builtin function callable from expression source.
///
/// Builtins receive eagerly evaluated argument values; laziness is not
/// needed because the only short-circuiting forms (`&&`, `||`) live in
/// the interpreter itself. Implementations are stateless, which is what
/// makes the registry's `Send + Sync` bound trivial even though the
/// `Value`s they handle are single-threaded.
pub trait Function: Send + Sync + 'static {
    /// Capability flags for this function.
    fn caps(&self) -> FnCaps {
        FnCaps::PURE
    }

    fn name(&self) -> &'static str;

    fn min_args(&self) -> usize {
        1
    }

    /// Largest accepted argument count; ignored when `variadic`.
    fn max_args(&self) -> usize {
        self.min_args()
    }

    fn variadic(&self) -> bool {
        false
    }

    fn eval(&self, args: &[Value], interp: &Interpreter) -> Result<Value, EngineError>;
}
