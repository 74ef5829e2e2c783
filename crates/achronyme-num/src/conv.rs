//! Linear convolution, direct and FFT-based.

use crate::fft::{fft_in_place, next_pow2};
use achronyme_common::{Complex, EngineError, EngineErrorKind};

fn check_nonempty(a: &[f64], b: &[f64]) -> Result<(), EngineError> {
    if a.is_empty() || b.is_empty() {
        return Err(EngineError::new(EngineErrorKind::Shape)
            .with_message("convolution of an empty vector"));
    }
    Ok(())
}

/// Direct O(N·M) convolution; output length `N + M − 1`.
pub fn conv(a: &[f64], b: &[f64]) -> Result<Vec<f64>, EngineError> {
    check_nonempty(a, b)?;
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    Ok(out)
}

/// FFT convolution: zero-pad to `next_pow2(N + M − 1)`, multiply
/// spectra, inverse-transform, truncate.
pub fn conv_fft(a: &[f64], b: &[f64]) -> Result<Vec<f64>, EngineError> {
    check_nonempty(a, b)?;
    let out_len = a.len() + b.len() - 1;
    let m = next_pow2(out_len)?;

    let mut fa = vec![Complex::ZERO; m];
    for (slot, &x) in fa.iter_mut().zip(a) {
        *slot = Complex::from_real(x);
    }
    let mut fb = vec![Complex::ZERO; m];
    for (slot, &x) in fb.iter_mut().zip(b) {
        *slot = Complex::from_real(x);
    }

    fft_in_place(&mut fa, false);
    fft_in_place(&mut fb, false);
    for k in 0..m {
        fa[k] = fa[k] * fb[k];
    }
    fft_in_place(&mut fa, true);

    let scale = 1.0 / m as f64;
    Ok(fa[..out_len].iter().map(|z| z.re * scale).collect())
}
