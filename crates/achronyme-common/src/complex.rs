use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// A complex number in rectangular form.
///
/// Plain `f64` pair, `Copy`, no NaN policy of its own: arithmetic follows
/// IEEE-754 through the underlying operations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };
    pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    /// Purely real value.
    #[inline]
    pub fn from_real(re: f64) -> Self {
        Complex { re, im: 0.0 }
    }

    /// `r · e^{iθ}`.
    #[inline]
    pub fn from_polar(r: f64, theta: f64) -> Self {
        Complex {
            re: r * theta.cos(),
            im: r * theta.sin(),
        }
    }

    /// `e^{iθ}` – unit phasor, the FFT twiddle building block.
    #[inline]
    pub fn cis(theta: f64) -> Self {
        Complex {
            re: theta.cos(),
            im: theta.sin(),
        }
    }

    #[inline]
    pub fn conj(self) -> Self {
        Complex {
            re: self.re,
            im: -self.im,
        }
    }

    /// Magnitude `|z|`, overflow-safe via `hypot`.
    #[inline]
    pub fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Squared magnitude; avoids the `sqrt` when only ordering matters.
    #[inline]
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Principal argument in `(-π, π]`.
    #[inline]
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }

    #[inline]
    pub fn scale(self, k: f64) -> Self {
        Complex {
            re: self.re * k,
            im: self.im * k,
        }
    }

    /// Complex exponential `e^z`.
    pub fn exp(self) -> Self {
        Complex::from_polar(self.re.exp(), self.im)
    }

    /// Principal natural logarithm.
    pub fn ln(self) -> Self {
        Complex {
            re: self.abs().ln(),
            im: self.arg(),
        }
    }

    /// Principal square root, via the half-angle identities rather than
    /// polar form so purely real inputs stay on an axis exactly.
    pub fn sqrt(self) -> Self {
        if self.re == 0.0 && self.im == 0.0 {
            return Complex::ZERO;
        }
        let r = self.abs();
        if self.re >= 0.0 {
            let t = ((r + self.re) / 2.0).sqrt();
            Complex {
                re: t,
                im: self.im / (2.0 * t),
            }
        } else {
            let u = ((r - self.re) / 2.0).sqrt();
            Complex {
                re: self.im.abs() / (2.0 * u),
                im: u.copysign(self.im),
            }
        }
    }

    /// `z^w` through the principal branch: `exp(w · ln z)`.
    ///
    /// `0^0` is defined as `1`; `0^w` is `0` for any other exponent.
    pub fn powc(self, exp: Complex) -> Self {
        if self == Complex::ZERO {
            return if exp == Complex::ZERO {
                Complex::ONE
            } else {
                Complex::ZERO
            };
        }
        (exp * self.ln()).exp()
    }

    /// `z^k` for a real exponent.
    pub fn powf(self, exp: f64) -> Self {
        self.powc(Complex::from_real(exp))
    }

    /// `sin(a + bi) = sin a · cosh b + i · cos a · sinh b`
    pub fn sin(self) -> Self {
        Complex {
            re: self.re.sin() * self.im.cosh(),
            im: self.re.cos() * self.im.sinh(),
        }
    }

    /// `cos(a + bi) = cos a · cosh b − i · sin a · sinh b`
    pub fn cos(self) -> Self {
        Complex {
            re: self.re.cos() * self.im.cosh(),
            im: -self.re.sin() * self.im.sinh(),
        }
    }

    pub fn tan(self) -> Self {
        self.sin() / self.cos()
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Complex::from_real(re)
    }
}

impl Add for Complex {
    type Output = Complex;
    #[inline]
    fn add(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Sub for Complex {
    type Output = Complex;
    #[inline]
    fn sub(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl Mul for Complex {
    type Output = Complex;
    #[inline]
    fn mul(self, rhs: Complex) -> Complex {
        Complex {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl Div for Complex {
    type Output = Complex;
    #[inline]
    fn div(self, rhs: Complex) -> Complex {
        let d = rhs.norm_sqr();
        Complex {
            re: (self.re * rhs.re + self.im * rhs.im) / d,
            im: (self.im * rhs.re - self.re * rhs.im) / d,
        }
    }
}

impl Neg for Complex {
    type Output = Complex;
    #[inline]
    fn neg(self) -> Complex {
        Complex {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl AddAssign for Complex {
    #[inline]
    fn add_assign(&mut self, rhs: Complex) {
        *self = *self + rhs;
    }
}

impl SubAssign for Complex {
    #[inline]
    fn sub_assign(&mut self, rhs: Complex) {
        *self = *self - rhs;
    }
}

impl MulAssign for Complex {
    #[inline]
    fn mul_assign(&mut self, rhs: Complex) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex, b: Complex) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn field_arithmetic() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(3.0, -1.0);
        assert_eq!(a + b, Complex::new(4.0, 1.0));
        assert_eq!(a * b, Complex::new(5.0, 5.0));
        assert!(close(a * b / b, a));
        assert_eq!(-a, Complex::new(-1.0, -2.0));
    }

    #[test]
    fn polar_roundtrip() {
        let z = Complex::from_polar(2.0, 0.75);
        assert!((z.abs() - 2.0).abs() < 1e-12);
        assert!((z.arg() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn sqrt_of_negative_real_is_imaginary() {
        let z = Complex::from_real(-4.0).sqrt();
        assert!(z.re.abs() < 1e-12);
        assert!((z.im - 2.0).abs() < 1e-12);
    }

    #[test]
    fn powc_handles_zero_base() {
        assert_eq!(Complex::ZERO.powc(Complex::ZERO), Complex::ONE);
        assert_eq!(Complex::ZERO.powc(Complex::new(2.0, 0.0)), Complex::ZERO);
    }

    #[test]
    fn trig_reduces_to_real_on_the_axis() {
        let z = Complex::from_real(0.5);
        assert!((z.sin().re - 0.5_f64.sin()).abs() < 1e-15);
        assert!(z.sin().im.abs() < 1e-15);
        assert!((z.cos().re - 0.5_f64.cos()).abs() < 1e-15);
    }

    #[test]
    fn sin_squared_plus_cos_squared_is_one() {
        let z = Complex::new(0.7, -0.3);
        let s = z.sin();
        let c = z.cos();
        assert!(close(s * s + c * c, Complex::ONE));
    }
}
