// Tolerance-aware helpers for the complex entries of a matrix.
//
// Entries are plain `Complex64` values; this module adds the comparison
// and classification contract that the matrix algorithms rely on.

use float_cmp::approx_eq;
use num_complex::Complex64;
use std::cmp::Ordering;

/// Default tolerance used by predicates and rank detection.
pub const DEFAULT_TOLERANCE: f64 = 1.0e-10;

pub const ZERO: Complex64 = Complex64 { re: 0.0, im: 0.0 };
pub const ONE: Complex64 = Complex64 { re: 1.0, im: 0.0 };

/// Resolves an optional tolerance to a concrete value.
pub(crate) fn tolerance_or_default(epsilon: Option<f64>) -> f64 {
    epsilon.unwrap_or(DEFAULT_TOLERANCE)
}

#[inline]
fn near(a: f64, b: f64, epsilon: f64) -> bool {
    approx_eq!(f64, a, b, epsilon = epsilon, ulps = 0)
}

/// Comparison and classification of complex entries with an explicit tolerance.
pub trait ComplexScalar: Sized + Copy {
    /// Magnitude `|z|`.
    fn norm_value(self) -> f64;

    /// `1 / z`.
    fn inv_value(self) -> Self;

    /// Both parts agree within `epsilon`.
    fn equals_eps(self, other: Self, epsilon: f64) -> bool;

    fn is_zero_eps(self, epsilon: f64) -> bool;

    fn is_one_eps(self, epsilon: f64) -> bool;

    /// Imaginary part vanishes within `epsilon`.
    fn is_real_eps(self, epsilon: f64) -> bool;

    /// Imaginary part does not vanish within `epsilon`.
    fn is_complex_eps(self, epsilon: f64) -> bool {
        !self.is_real_eps(epsilon)
    }

    /// Real with an integral real part.
    fn is_integer_eps(self, epsilon: f64) -> bool;

    /// Both parts integral.
    fn is_complex_integer_eps(self, epsilon: f64) -> bool;

    fn is_nan_value(self) -> bool;

    fn is_infinite_value(self) -> bool;

    fn is_finite_value(self) -> bool;

    /// Orders by real part, then by imaginary part. Values within `epsilon`
    /// of each other compare equal.
    fn compare_to(self, other: Self, epsilon: f64) -> Ordering;

    /// `z / |z|`, zero for zero.
    fn signum_value(self) -> Self;

    /// Truncates both parts toward zero.
    fn fix(self) -> Self;

    /// `z - fix(z)`.
    fn fract(self) -> Self;

    fn floor(self) -> Self;

    fn ceil(self) -> Self;

    fn round(self) -> Self;

    /// Four-quadrant arctangent `atan2(self, other)` on the real parts.
    fn atan2_value(self, other: Self) -> Self;
}

impl ComplexScalar for Complex64 {
    #[inline]
    fn norm_value(self) -> f64 {
        self.norm()
    }

    #[inline]
    fn inv_value(self) -> Self {
        self.inv()
    }

    fn equals_eps(self, other: Self, epsilon: f64) -> bool {
        near(self.re, other.re, epsilon) && near(self.im, other.im, epsilon)
    }

    fn is_zero_eps(self, epsilon: f64) -> bool {
        self.equals_eps(ZERO, epsilon)
    }

    fn is_one_eps(self, epsilon: f64) -> bool {
        self.equals_eps(ONE, epsilon)
    }

    fn is_real_eps(self, epsilon: f64) -> bool {
        near(self.im, 0.0, epsilon)
    }

    fn is_integer_eps(self, epsilon: f64) -> bool {
        self.is_real_eps(epsilon) && near(self.re, self.re.round(), epsilon)
    }

    fn is_complex_integer_eps(self, epsilon: f64) -> bool {
        near(self.re, self.re.round(), epsilon) && near(self.im, self.im.round(), epsilon)
    }

    fn is_nan_value(self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }

    fn is_infinite_value(self) -> bool {
        self.re.is_infinite() || self.im.is_infinite()
    }

    fn is_finite_value(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    fn compare_to(self, other: Self, epsilon: f64) -> Ordering {
        if self.equals_eps(other, epsilon) {
            return Ordering::Equal;
        }
        if !near(self.re, other.re, epsilon) {
            return if self.re < other.re {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        if self.im < other.im {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    fn signum_value(self) -> Self {
        let n = self.norm();
        if n == 0.0 {
            ZERO
        } else {
            self / n
        }
    }

    fn fix(self) -> Self {
        Complex64::new(self.re.trunc(), self.im.trunc())
    }

    fn fract(self) -> Self {
        self - ComplexScalar::fix(self)
    }

    fn floor(self) -> Self {
        Complex64::new(self.re.floor(), self.im.floor())
    }

    fn ceil(self) -> Self {
        Complex64::new(self.re.ceil(), self.im.ceil())
    }

    fn round(self) -> Self {
        Complex64::new(self.re.round(), self.im.round())
    }

    fn atan2_value(self, other: Self) -> Self {
        Complex64::new(self.re.atan2(other.re), 0.0)
    }
}

/// Number of decimals needed to print `x` exactly (capped), zero for integers.
pub(crate) fn decimal_places(x: f64) -> usize {
    if !x.is_finite() || x.fract() == 0.0 {
        return 0;
    }
    let text = format!("{}", x.abs());
    match text.split_once('.') {
        Some((_, frac)) => frac.len(),
        None => 0,
    }
}
