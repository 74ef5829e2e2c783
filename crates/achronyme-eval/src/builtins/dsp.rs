//! FFT, convolution and window builtins.

use super::utils::{as_complex_slice, expect_count, expect_vector, type_error};
use crate::function::{FnCaps, Function};
use crate::function_registry::register_function;
use crate::interpreter::Interpreter;
use crate::value::Value;
use achronyme_common::{EngineError, EngineErrorKind};
use achronyme_num::{conv, fft, window};
use std::sync::Arc;

/// The `ifft` realness threshold: imaginary parts below
/// `1e-10 · max|re|` collapse to a real vector.
const IFFT_REAL_TOL: f64 = 1e-10;

fn check_work_len(work: usize, interp: &Interpreter) -> Result<(), EngineError> {
    if work > interp.config().max_fft_len {
        return Err(EngineError::new(EngineErrorKind::Overflow).with_message(format!(
            "transform working length {work} exceeds the configured maximum {}",
            interp.config().max_fft_len
        )));
    }
    Ok(())
}

/// Guard for the exact-length transforms (radix-2 or chirp-z buffer).
fn check_fft_len(len: usize, interp: &Interpreter) -> Result<(), EngineError> {
    check_work_len(fft::working_len(len)?, interp)
}

struct FftFn;

/// Forward DFT of a real or complex vector.
///
/// # Remarks
/// - The transform is exact at the input length: radix-2 for powers of
///   two, the chirp-z path otherwise, so `ifft(fft(v))` reproduces `v`
///   at every length.
/// - Forward transforms are unscaled; bins are ordered
///   `DC, f₁, …` with no fftshift.
impl Function for FftFn {
    fn name(&self) -> &'static str {
        "fft"
    }

    fn eval(&self, args: &[Value], interp: &Interpreter) -> Result<Value, EngineError> {
        let signal = as_complex_slice("fft", &args[0])?;
        check_fft_len(signal.len(), interp)?;
        Ok(Value::ComplexVector(fft::dft(&signal)?))
    }
}

struct FftMagFn;

impl Function for FftMagFn {
    fn name(&self) -> &'static str {
        "fft_mag"
    }

    fn eval(&self, args: &[Value], interp: &Interpreter) -> Result<Value, EngineError> {
        match &args[0] {
            Value::Vector(xs) => {
                check_fft_len(xs.len(), interp)?;
                Ok(Value::Vector(fft::fft_mag(xs)?))
            }
            Value::ComplexVector(zs) => {
                check_fft_len(zs.len(), interp)?;
                let spectrum = fft::dft(zs)?;
                Ok(Value::Vector(spectrum.into_iter().map(|z| z.abs()).collect()))
            }
            other => Err(type_error(format!(
                "fft_mag expects a vector or complex vector, got {}",
                other.type_name()
            ))),
        }
    }
}

struct IfftFn;

/// Inverse DFT with `1/N` scaling, exact at the input length.
///
/// # Remarks
/// - By default the inverse must be real to within `1e-10 · max|re|`,
///   otherwise the call fails; engines configured with relaxed mode
///   return the complex vector instead.
/// - Non-power-of-two lengths go through the chirp-z path, so a
///   truncated spectrum still inverts exactly at its own length.
impl Function for IfftFn {
    fn name(&self) -> &'static str {
        "ifft"
    }

    fn eval(&self, args: &[Value], interp: &Interpreter) -> Result<Value, EngineError> {
        let spectrum = as_complex_slice("ifft", &args[0])?;
        check_fft_len(spectrum.len(), interp)?;
        let time = fft::ifft(&spectrum)?;
        if !interp.config().strict_ifft {
            return Ok(Value::ComplexVector(time));
        }
        match fft::try_real(&time, IFFT_REAL_TOL) {
            Some(xs) => Ok(Value::Vector(xs)),
            None => Err(EngineError::new(EngineErrorKind::NonRealResult)
                .with_message("inverse transform has a non-negligible imaginary part")),
        }
    }
}

/// Direct or FFT convolution, selected by name.
struct ConvFn {
    name: &'static str,
    apply: fn(&[f64], &[f64]) -> Result<Vec<f64>, EngineError>,
}

impl Function for ConvFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn min_args(&self) -> usize {
        2
    }

    fn eval(&self, args: &[Value], interp: &Interpreter) -> Result<Value, EngineError> {
        let a = expect_vector(self.name, &args[0])?;
        let b = expect_vector(self.name, &args[1])?;
        if !a.is_empty() && !b.is_empty() {
            // FFT convolution pads straight to the next power of two.
            check_work_len(fft::next_pow2(a.len() + b.len() - 1)?, interp)?;
        }
        Ok(Value::Vector((self.apply)(a, b)?))
    }
}

/// Window generators: `hann(n)`, `hamming(n)`, `blackman(n)`.
struct WindowFn {
    name: &'static str,
    apply: fn(usize) -> Vec<f64>,
}

impl Function for WindowFn {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::NUMERIC_ONLY
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn eval(&self, args: &[Value], _interp: &Interpreter) -> Result<Value, EngineError> {
        let n = expect_count(self.name, &args[0])?;
        Ok(Value::Vector((self.apply)(n)))
    }
}

pub fn register_builtins() {
    register_function(Arc::new(FftFn));
    register_function(Arc::new(FftMagFn));
    register_function(Arc::new(IfftFn));
    register_function(Arc::new(ConvFn {
        name: "conv",
        apply: conv::conv,
    }));
    register_function(Arc::new(ConvFn {
        name: "conv_fft",
        apply: conv::conv_fft,
    }));
    register_function(Arc::new(WindowFn {
        name: "hann",
        apply: window::hann,
    }));
    register_function(Arc::new(WindowFn {
        name: "hamming",
        apply: window::hamming,
    }));
    register_function(Arc::new(WindowFn {
        name: "blackman",
        apply: window::blackman,
    }));
}
