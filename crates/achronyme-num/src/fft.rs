//! Discrete Fourier transforms.
//!
//! The workhorse is an in-place radix-2 decimation-in-time Cooley–Tukey
//! with precomputed bit-reversal and twiddle tables. Arbitrary exact
//! lengths go through Bluestein's chirp-z algorithm, which itself runs
//! on the radix-2 kernel at `next_pow2(2N − 1)`.
//!
//! Normalization: forward transforms are unscaled; inverses divide by
//! the transform length. Bin order is `DC, f₁, …, f_{N−1}` — no fftshift.

use achronyme_common::{Complex, EngineError, EngineErrorKind};
use std::f64::consts::PI;

/// Smallest power of two `≥ n` (`1` for `n ≤ 1`), or `Overflow` when the
/// computation leaves the addressable range.
pub fn next_pow2(n: usize) -> Result<usize, EngineError> {
    if n <= 1 {
        return Ok(1);
    }
    n.checked_next_power_of_two().ok_or_else(|| {
        EngineError::new(EngineErrorKind::Overflow)
            .with_message(format!("next power of two of {n} is not addressable"))
    })
}

fn bit_reversal_table(n: usize) -> Vec<usize> {
    let bits = n.trailing_zeros();
    let mut table = vec![0usize; n];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = i.reverse_bits() >> (usize::BITS - bits);
    }
    table
}

/// In-place radix-2 DIT transform. `buf.len()` must be a power of two.
/// Neither direction scales; callers divide by `N` after an inverse.
pub fn fft_in_place(buf: &mut [Complex], inverse: bool) {
    let n = buf.len();
    if n <= 1 {
        return;
    }
    debug_assert!(n.is_power_of_two());

    let rev = bit_reversal_table(n);
    for i in 0..n {
        let j = rev[i];
        if i < j {
            buf.swap(i, j);
        }
    }

    let sign = if inverse { 1.0 } else { -1.0 };
    let twiddles: Vec<Complex> = (0..n / 2)
        .map(|k| Complex::cis(sign * 2.0 * PI * k as f64 / n as f64))
        .collect();

    let mut len = 2;
    while len <= n {
        let stride = n / len;
        for start in (0..n).step_by(len) {
            for k in 0..len / 2 {
                let w = twiddles[k * stride];
                let u = buf[start + k];
                let v = buf[start + k + len / 2] * w;
                buf[start + k] = u + v;
                buf[start + k + len / 2] = u - v;
            }
        }
        len <<= 1;
    }
}

/// Length of the radix-2 working buffer behind an exact `n`-point
/// transform: `n` itself for powers of two, the Bluestein convolution
/// size `next_pow2(2n − 1)` otherwise.
pub fn working_len(n: usize) -> Result<usize, EngineError> {
    if n <= 1 {
        return Ok(1);
    }
    if n.is_power_of_two() {
        Ok(n)
    } else {
        next_pow2(2 * n - 1)
    }
}

/// Exact-length forward DFT: radix-2 when `N` is a power of two,
/// Bluestein otherwise. The output length equals the input length, so
/// `ifft(dft(v)) == v` at every length.
pub fn dft(xs: &[Complex]) -> Result<Vec<Complex>, EngineError> {
    if xs.is_empty() {
        return Ok(Vec::new());
    }
    if xs.len().is_power_of_two() {
        let mut buf = xs.to_vec();
        fft_in_place(&mut buf, false);
        Ok(buf)
    } else {
        bluestein(xs, false)
    }
}

/// Exact-length forward DFT of a real signal.
pub fn dft_real(xs: &[f64]) -> Result<Vec<Complex>, EngineError> {
    let buf: Vec<Complex> = xs.iter().map(|&x| Complex::from_real(x)).collect();
    dft(&buf)
}

/// Magnitude spectrum `|dft(x)|`; one pass over the transform buffer.
pub fn fft_mag(xs: &[f64]) -> Result<Vec<f64>, EngineError> {
    let buf = dft_real(xs)?;
    Ok(buf.into_iter().map(Complex::abs).collect())
}

/// Exact-length inverse DFT with `1/N` scaling.
pub fn ifft(xs: &[Complex]) -> Result<Vec<Complex>, EngineError> {
    if xs.is_empty() {
        return Ok(Vec::new());
    }
    let n = xs.len();
    let mut buf = if n.is_power_of_two() {
        let mut buf = xs.to_vec();
        fft_in_place(&mut buf, true);
        buf
    } else {
        bluestein(xs, true)?
    };
    let scale = 1.0 / n as f64;
    for z in &mut buf {
        *z = z.scale(scale);
    }
    Ok(buf)
}

/// Collapse a complex vector to its real parts when every imaginary
/// part is at most `rel_tol · max|re|`.
pub fn try_real(xs: &[Complex], rel_tol: f64) -> Option<Vec<f64>> {
    let max_re = xs.iter().fold(0.0_f64, |acc, z| acc.max(z.re.abs()));
    let tol = rel_tol * max_re;
    if xs.iter().all(|z| z.im.abs() <= tol) {
        Some(xs.iter().map(|z| z.re).collect())
    } else {
        None
    }
}

/// Bluestein's chirp-z transform: an exact `N`-point DFT expressed as a
/// convolution, evaluated with radix-2 FFTs of length
/// `next_pow2(2N − 1)`.
fn bluestein(xs: &[Complex], inverse: bool) -> Result<Vec<Complex>, EngineError> {
    let n = xs.len();
    let m = next_pow2(2 * n - 1)?;
    let sign = if inverse { 1.0 } else { -1.0 };

    // chirp[k] = e^{sign·iπk²/n}; k² is reduced mod 2n to keep the
    // angle argument exact for large k.
    let chirp: Vec<Complex> = (0..n)
        .map(|k| {
            let kk = (k as u64 * k as u64) % (2 * n as u64);
            Complex::cis(sign * PI * kk as f64 / n as f64)
        })
        .collect();

    let mut a = vec![Complex::ZERO; m];
    for k in 0..n {
        a[k] = xs[k] * chirp[k];
    }
    let mut b = vec![Complex::ZERO; m];
    b[0] = chirp[0].conj();
    for k in 1..n {
        b[k] = chirp[k].conj();
        b[m - k] = chirp[k].conj();
    }

    fft_in_place(&mut a, false);
    fft_in_place(&mut b, false);
    for k in 0..m {
        a[k] = a[k] * b[k];
    }
    fft_in_place(&mut a, true);

    let scale = 1.0 / m as f64;
    Ok((0..n).map(|k| a[k].scale(scale) * chirp[k]).collect())
}
