//! The engine façade: slow-path `eval` plus the typed fast-path entry
//! points that operate on handles.
//!
//! Every fast-path operation follows the same order: validate handles,
//! validate variants, run the kernel, then allocate the result. Nothing
//! is written into the arena before the kernel has succeeded, so a
//! failing call never leaves partial state behind.

use crate::arena::{ArenaStats, Handle, HandleArena};
use achronyme_common::{Complex, EngineConfig, EngineError, EngineErrorKind, Matrix};
use achronyme_eval::builtins::generate::linspace;
use achronyme_eval::{Env, Interpreter, Value};
use achronyme_num::{conv, elementwise, fft, linalg, stats, window};
use achronyme_parse::parse_script;

/// Fast-path element-wise kernels of one vector (or scalar) operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryKernel {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Abs,
}

impl UnaryKernel {
    fn apply(self, x: f64) -> f64 {
        match self {
            UnaryKernel::Sin => x.sin(),
            UnaryKernel::Cos => x.cos(),
            UnaryKernel::Tan => x.tan(),
            UnaryKernel::Exp => x.exp(),
            UnaryKernel::Ln => x.ln(),
            UnaryKernel::Sqrt => x.sqrt(),
            UnaryKernel::Abs => x.abs(),
        }
    }
}

pub struct Engine {
    arena: HandleArena,
    root: Env,
    interp: Interpreter,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Engine {
            arena: HandleArena::new(),
            root: Env::with_prelude(),
            interp: Interpreter::with_config(config),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &ArenaStats {
        self.arena.stats()
    }

    pub fn active_handles(&self) -> u64 {
        self.arena.stats().active_handles()
    }

    /* ═══════════════════ slow path ═══════════════════ */

    /// Evaluate a `;`-separated script against the root environment and
    /// return the last value, stringified. An empty script yields an
    /// empty string.
    pub fn eval(&mut self, source: &str) -> Result<String, EngineError> {
        self.arena.note_slow_op();
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "achronyme::engine", len = source.len(), "eval");

        let nodes = parse_script(source)?;
        let mut last: Option<Value> = None;
        for node in &nodes {
            last = Some(self.interp.evaluate(node, &self.root)?);
        }
        Ok(last.map(|v| v.format()).unwrap_or_default())
    }

    /* ═══════════════════ lifecycle ═══════════════════ */

    /// Clear all slots, bindings and counters and re-seed the root
    /// environment. The engine behaves as freshly constructed.
    pub fn reset(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "achronyme::engine", "reset");
        self.arena.reset();
        self.root = Env::with_prelude();
    }

    /// Free a handle; no-op when already freed. Names bound to the
    /// handle are removed from the root environment as well.
    pub fn release_handle(&mut self, h: Handle) {
        for name in self.arena.release(h) {
            self.root.unbind(&name);
        }
    }

    /// Make a handle's value reachable from `eval` under `name`.
    /// Re-binding replaces the previous mapping.
    pub fn bind_variable_to_handle(&mut self, name: &str, h: Handle) -> Result<(), EngineError> {
        let value = self.arena.get(h)?.clone();
        self.arena.bind_name(name, h)?;
        self.root.bind(name, value);
        Ok(())
    }

    /* ═══════════════════ creation / retrieval ═══════════════════ */

    pub fn create_vector(&mut self, data: Vec<f64>) -> Handle {
        self.arena.note_fast_op();
        self.arena.alloc(Value::Vector(data))
    }

    pub fn create_matrix(
        &mut self,
        data: Vec<f64>,
        rows: usize,
        cols: usize,
    ) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let m = Matrix::new(rows, cols, data)?;
        Ok(self.arena.alloc(Value::Matrix(m)))
    }

    /// Build a complex vector from interleaved `re, im` pairs. An odd
    /// buffer length is a shape error.
    pub fn create_complex_vector(&mut self, interleaved: &[f64]) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        if interleaved.len() % 2 != 0 {
            return Err(EngineError::new(EngineErrorKind::Shape).with_message(format!(
                "interleaved complex buffer has odd length {}",
                interleaved.len()
            )));
        }
        let zs: Vec<Complex> = interleaved
            .chunks_exact(2)
            .map(|pair| Complex::new(pair[0], pair[1]))
            .collect();
        Ok(self.arena.alloc(Value::ComplexVector(zs)))
    }

    pub fn value(&self, h: Handle) -> Result<&Value, EngineError> {
        self.arena.get(h)
    }

    pub fn get_vector(&self, h: Handle) -> Result<&[f64], EngineError> {
        match self.arena.get(h)? {
            Value::Vector(xs) => Ok(xs),
            other => Err(variant_error("get_vector", "vector", other)),
        }
    }

    pub fn get_matrix(&self, h: Handle) -> Result<&Matrix, EngineError> {
        match self.arena.get(h)? {
            Value::Matrix(m) => Ok(m),
            other => Err(variant_error("get_matrix", "matrix", other)),
        }
    }

    pub fn get_complex_vector(&self, h: Handle) -> Result<&[Complex], EngineError> {
        match self.arena.get(h)? {
            Value::ComplexVector(zs) => Ok(zs),
            other => Err(variant_error("get_complex_vector", "complex vector", other)),
        }
    }

    pub fn linspace(&mut self, a: f64, b: f64, n: usize) -> Handle {
        self.arena.note_fast_op();
        self.arena.alloc(Value::Vector(linspace(a, b, n)))
    }

    pub fn identity(&mut self, n: usize) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        if n == 0 {
            return Err(EngineError::new(EngineErrorKind::Shape)
                .with_message("identity requires a positive size"));
        }
        Ok(self.arena.alloc(Value::Matrix(Matrix::identity(n))))
    }

    /* ═══════════════════ element-wise ═══════════════════ */

    /// `sin`/`cos`/…/`abs` over a vector handle.
    pub fn map_unary(&mut self, kernel: UnaryKernel, h: Handle) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let out = match self.arena.get(h)? {
            Value::Vector(xs) => elementwise::map(xs, |x| kernel.apply(x)),
            other => return Err(variant_error("math kernel", "vector", other)),
        };
        Ok(self.arena.alloc(Value::Vector(out)))
    }

    pub fn vadd(&mut self, a: Handle, b: Handle) -> Result<Handle, EngineError> {
        self.binary_elementwise(a, b, |x, y| x + y)
    }

    pub fn vsub(&mut self, a: Handle, b: Handle) -> Result<Handle, EngineError> {
        self.binary_elementwise(a, b, |x, y| x - y)
    }

    pub fn vmul(&mut self, a: Handle, b: Handle) -> Result<Handle, EngineError> {
        self.binary_elementwise(a, b, |x, y| x * y)
    }

    pub fn vdiv(&mut self, a: Handle, b: Handle) -> Result<Handle, EngineError> {
        self.binary_elementwise(a, b, |x, y| x / y)
    }

    /// Two equal-length vectors, or a length-1 vector broadcast against
    /// the other operand.
    fn binary_elementwise(
        &mut self,
        a: Handle,
        b: Handle,
        f: fn(f64, f64) -> f64,
    ) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let xs = self.get_vector(a)?;
        let ys = self.get_vector(b)?;
        let out = elementwise::broadcast_zip(xs, ys, f)?;
        Ok(self.arena.alloc(Value::Vector(out)))
    }

    /* ═══════════════════ reductions ═══════════════════ */

    pub fn dot(&mut self, a: Handle, b: Handle) -> Result<f64, EngineError> {
        self.arena.note_fast_op();
        stats::dot(self.get_vector(a)?, self.get_vector(b)?)
    }

    pub fn sum(&mut self, h: Handle) -> Result<f64, EngineError> {
        self.arena.note_fast_op();
        Ok(stats::sum(self.get_vector(h)?))
    }

    pub fn mean(&mut self, h: Handle) -> Result<f64, EngineError> {
        self.arena.note_fast_op();
        Ok(stats::mean(self.get_vector(h)?))
    }

    pub fn std(&mut self, h: Handle, ddof: usize) -> Result<f64, EngineError> {
        self.arena.note_fast_op();
        stats::std(self.get_vector(h)?, ddof)
    }

    pub fn min(&mut self, h: Handle) -> Result<f64, EngineError> {
        self.arena.note_fast_op();
        stats::min(self.get_vector(h)?)
    }

    pub fn max(&mut self, h: Handle) -> Result<f64, EngineError> {
        self.arena.note_fast_op();
        stats::max(self.get_vector(h)?)
    }

    pub fn norm(&mut self, h: Handle) -> Result<f64, EngineError> {
        self.arena.note_fast_op();
        Ok(stats::norm(self.get_vector(h)?))
    }

    pub fn norm_l1(&mut self, h: Handle) -> Result<f64, EngineError> {
        self.arena.note_fast_op();
        Ok(stats::norm_l1(self.get_vector(h)?))
    }

    /* ═══════════════════ FFT / convolution / windows ═══════════════════ */

    fn check_work_len(&self, work: usize) -> Result<(), EngineError> {
        if work > self.config.max_fft_len {
            return Err(EngineError::new(EngineErrorKind::Overflow).with_message(format!(
                "transform working length {work} exceeds the configured maximum {}",
                self.config.max_fft_len
            )));
        }
        Ok(())
    }

    /// Guard for the exact-length transforms (radix-2 or chirp-z
    /// buffer).
    fn check_fft_len(&self, len: usize) -> Result<(), EngineError> {
        self.check_work_len(fft::working_len(len)?)
    }

    fn complex_input(&self, name: &'static str, h: Handle) -> Result<Vec<Complex>, EngineError> {
        match self.arena.get(h)? {
            Value::Vector(xs) => Ok(xs.iter().map(|&x| Complex::from_real(x)).collect()),
            Value::ComplexVector(zs) => Ok(zs.clone()),
            other => Err(variant_error(name, "vector or complex vector", other)),
        }
    }

    /// Exact at the input length (radix-2 for powers of two, chirp-z
    /// otherwise), so `ifft` inverts it for any length.
    pub fn fft(&mut self, h: Handle) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let signal = self.complex_input("fft", h)?;
        self.check_fft_len(signal.len())?;
        let spectrum = fft::dft(&signal)?;
        Ok(self.arena.alloc(Value::ComplexVector(spectrum)))
    }

    pub fn fft_mag(&mut self, h: Handle) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let signal = self.complex_input("fft_mag", h)?;
        self.check_fft_len(signal.len())?;
        let mags: Vec<f64> = fft::dft(&signal)?.into_iter().map(|z| z.abs()).collect();
        Ok(self.arena.alloc(Value::Vector(mags)))
    }

    /// Strict by default: the inverse must be real to within
    /// `1e-10 · max|re|`, else `NonRealResult`. With
    /// `EngineConfig::strict_ifft = false` the complex result is
    /// returned instead.
    pub fn ifft(&mut self, h: Handle) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let spectrum = self.complex_input("ifft", h)?;
        self.check_fft_len(spectrum.len())?;
        let time = fft::ifft(&spectrum)?;
        if self.config.strict_ifft {
            match fft::try_real(&time, 1e-10) {
                Some(xs) => Ok(self.arena.alloc(Value::Vector(xs))),
                None => Err(EngineError::new(EngineErrorKind::NonRealResult)
                    .with_message("inverse transform has a non-negligible imaginary part")),
            }
        } else {
            Ok(self.arena.alloc(Value::ComplexVector(time)))
        }
    }

    pub fn conv(&mut self, a: Handle, b: Handle) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let out = conv::conv(self.get_vector(a)?, self.get_vector(b)?)?;
        Ok(self.arena.alloc(Value::Vector(out)))
    }

    pub fn conv_fft(&mut self, a: Handle, b: Handle) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let xs = self.get_vector(a)?;
        let ys = self.get_vector(b)?;
        if !xs.is_empty() && !ys.is_empty() {
            // FFT convolution pads straight to the next power of two.
            self.check_work_len(fft::next_pow2(xs.len() + ys.len() - 1)?)?;
        }
        let out = conv::conv_fft(xs, ys)?;
        Ok(self.arena.alloc(Value::Vector(out)))
    }

    pub fn hann_window(&mut self, n: usize) -> Handle {
        self.arena.note_fast_op();
        self.arena.alloc(Value::Vector(window::hann(n)))
    }

    pub fn hamming_window(&mut self, n: usize) -> Handle {
        self.arena.note_fast_op();
        self.arena.alloc(Value::Vector(window::hamming(n)))
    }

    pub fn blackman_window(&mut self, n: usize) -> Handle {
        self.arena.note_fast_op();
        self.arena.alloc(Value::Vector(window::blackman(n)))
    }

    /* ═══════════════════ linear algebra ═══════════════════ */

    /// `(L, U, P)` handles with `P·A = L·U`.
    pub fn lu(&mut self, h: Handle) -> Result<(Handle, Handle, Handle), EngineError> {
        self.arena.note_fast_op();
        let factors = linalg::lu(self.get_matrix(h)?)?;
        let p = factors.permutation_matrix();
        let l = self.arena.alloc(Value::Matrix(factors.lower));
        let u = self.arena.alloc(Value::Matrix(factors.upper));
        let p = self.arena.alloc(Value::Matrix(p));
        Ok((l, u, p))
    }

    pub fn qr(&mut self, h: Handle) -> Result<(Handle, Handle), EngineError> {
        self.arena.note_fast_op();
        let (q, r) = linalg::qr(self.get_matrix(h)?)?;
        let q = self.arena.alloc(Value::Matrix(q));
        let r = self.arena.alloc(Value::Matrix(r));
        Ok((q, r))
    }

    /// `(U, S, V)` handles; `S` is a vector of descending singular
    /// values.
    pub fn svd(&mut self, h: Handle) -> Result<(Handle, Handle, Handle), EngineError> {
        self.arena.note_fast_op();
        let (u, s, v) = linalg::svd(self.get_matrix(h)?)?;
        let u = self.arena.alloc(Value::Matrix(u));
        let s = self.arena.alloc(Value::Vector(s));
        let v = self.arena.alloc(Value::Matrix(v));
        Ok((u, s, v))
    }

    pub fn cholesky(&mut self, h: Handle) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let l = linalg::cholesky(self.get_matrix(h)?)?;
        Ok(self.arena.alloc(Value::Matrix(l)))
    }

    pub fn inverse(&mut self, h: Handle) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let inv = linalg::inverse(self.get_matrix(h)?)?;
        Ok(self.arena.alloc(Value::Matrix(inv)))
    }

    pub fn det(&mut self, h: Handle) -> Result<f64, EngineError> {
        self.arena.note_fast_op();
        linalg::det(self.get_matrix(h)?)
    }

    /// Dominant eigenpair: the eigenvalue is returned directly, the
    /// eigenvector as a new handle.
    pub fn power_iteration(
        &mut self,
        h: Handle,
        max_iter: usize,
        tol: f64,
    ) -> Result<(f64, Handle), EngineError> {
        self.arena.note_fast_op();
        let (lambda, v) = linalg::power_iteration(self.get_matrix(h)?, max_iter, tol)?;
        Ok((lambda, self.arena.alloc(Value::Vector(v))))
    }

    pub fn qr_eigenvalues(
        &mut self,
        h: Handle,
        max_iter: usize,
        tol: f64,
    ) -> Result<Handle, EngineError> {
        self.arena.note_fast_op();
        let values = linalg::qr_eigenvalues(self.get_matrix(h)?, max_iter, tol)?;
        Ok(self.arena.alloc(Value::Vector(values)))
    }

    /// `(values, vectors)` handles.
    pub fn eigen_symmetric(
        &mut self,
        h: Handle,
        max_iter: usize,
        tol: f64,
    ) -> Result<(Handle, Handle), EngineError> {
        self.arena.note_fast_op();
        let (values, vectors) = linalg::eigen_symmetric(self.get_matrix(h)?, max_iter, tol)?;
        let values = self.arena.alloc(Value::Vector(values));
        let vectors = self.arena.alloc(Value::Matrix(vectors));
        Ok((values, vectors))
    }

    pub fn is_symmetric(&mut self, h: Handle, tol: f64) -> Result<bool, EngineError> {
        self.arena.note_fast_op();
        Ok(linalg::is_symmetric(self.get_matrix(h)?, tol))
    }

    pub fn is_positive_definite(&mut self, h: Handle) -> Result<bool, EngineError> {
        self.arena.note_fast_op();
        Ok(linalg::is_positive_definite(self.get_matrix(h)?))
    }
}

fn variant_error(op: &str, expected: &str, got: &Value) -> EngineError {
    EngineError::new(EngineErrorKind::TypeMismatch)
        .with_message(format!("{op} expects a {expected}, got {}", got.type_name()))
}
