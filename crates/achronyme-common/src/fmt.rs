//! Result stringification shared by the slow path and the C ABI.
//!
//! Scalars use Rust's shortest-round-trip `f64` rendering (which stays
//! within the host's 15-significant-digit contract); non-finite values
//! follow the host spelling (`Infinity`, `-Infinity`, `NaN`). Nothing
//! here is locale-dependent.

use crate::complex::Complex;
use crate::matrix::Matrix;

/// Render a scalar.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x == 0.0 {
        // Negative zero prints as plain zero.
        return "0".to_string();
    }
    format!("{x}")
}

/// Render a complex value as `a + bi` / `a - bi`.
///
/// A zero real part renders bare `bi`; a zero imaginary part falls back
/// to the plain scalar rendering.
pub fn format_complex(z: Complex) -> String {
    if z.im == 0.0 {
        return format_number(z.re);
    }
    if z.re == 0.0 {
        return format!("{}i", format_number(z.im));
    }
    if z.im < 0.0 {
        format!("{} - {}i", format_number(z.re), format_number(-z.im))
    } else {
        format!("{} + {}i", format_number(z.re), format_number(z.im))
    }
}

/// `[1, 2, 3]`
pub fn format_vector(xs: &[f64]) -> String {
    let parts: Vec<String> = xs.iter().map(|&x| format_number(x)).collect();
    format!("[{}]", parts.join(", "))
}

/// `[1 + 2i, 3]`
pub fn format_complex_vector(zs: &[Complex]) -> String {
    let parts: Vec<String> = zs.iter().map(|&z| format_complex(z)).collect();
    format!("[{}]", parts.join(", "))
}

/// `[[1, 2], [3, 4]]` — one inner list per row.
pub fn format_matrix(m: &Matrix) -> String {
    let rows: Vec<String> = (0..m.rows()).map(|i| format_vector(m.row(i))).collect();
    format!("[{}]", rows.join(", "))
}
