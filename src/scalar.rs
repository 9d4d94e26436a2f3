use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use num_complex::Complex;
use num_traits::{Float, One, Zero};

use crate::real::Real;

/// Element type of operator inputs and outputs.
///
/// Implemented for `f32`, `f64` and their complex counterparts. The
/// associated [`Real`] type is the underlying field, used for step
/// sizes, norms and tolerances, which stay real even when the data is
/// complex.
pub trait Scalar:
    Copy
    + Default
    + Debug
    + Display
    + PartialEq
    + Send
    + Sync
    + 'static
    + Zero
    + One
    + Neg<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    type Real: Real;

    /// Embed a real number.
    fn from_real(re: Self::Real) -> Self;

    /// Build from real and imaginary parts. Real scalar types discard
    /// the imaginary part.
    fn from_re_im(re: Self::Real, im: Self::Real) -> Self;

    /// Complex conjugate (identity for real types).
    fn conj(self) -> Self;

    /// Squared modulus `|x|^2`.
    fn abs_sq(self) -> Self::Real;

    fn re(self) -> Self::Real;

    fn im(self) -> Self::Real;

    /// Multiply by a real factor.
    fn scale(self, factor: Self::Real) -> Self;

    fn is_finite(self) -> bool;

    /// Modulus `|x|`.
    fn modulus(self) -> Self::Real {
        self.abs_sq().sqrt()
    }
}

impl Scalar for f32 {
    type Real = f32;

    #[inline]
    fn from_real(re: f32) -> Self {
        re
    }

    #[inline]
    fn from_re_im(re: f32, _im: f32) -> Self {
        re
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs_sq(self) -> f32 {
        self * self
    }

    #[inline]
    fn re(self) -> f32 {
        self
    }

    #[inline]
    fn im(self) -> f32 {
        0.0
    }

    #[inline]
    fn scale(self, factor: f32) -> Self {
        self * factor
    }

    #[inline]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }

    #[inline]
    fn modulus(self) -> f32 {
        self.abs()
    }
}

impl Scalar for f64 {
    type Real = f64;

    #[inline]
    fn from_real(re: f64) -> Self {
        re
    }

    #[inline]
    fn from_re_im(re: f64, _im: f64) -> Self {
        re
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs_sq(self) -> f64 {
        self * self
    }

    #[inline]
    fn re(self) -> f64 {
        self
    }

    #[inline]
    fn im(self) -> f64 {
        0.0
    }

    #[inline]
    fn scale(self, factor: f64) -> Self {
        self * factor
    }

    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    #[inline]
    fn modulus(self) -> f64 {
        self.abs()
    }
}

impl<F: Real> Scalar for Complex<F> {
    type Real = F;

    #[inline]
    fn from_real(re: F) -> Self {
        Complex::new(re, F::zero())
    }

    #[inline]
    fn from_re_im(re: F, im: F) -> Self {
        Complex::new(re, im)
    }

    #[inline]
    fn conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }

    #[inline]
    fn abs_sq(self) -> F {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn re(self) -> F {
        self.re
    }

    #[inline]
    fn im(self) -> F {
        self.im
    }

    #[inline]
    fn scale(self, factor: F) -> Self {
        Complex::new(self.re * factor, self.im * factor)
    }

    #[inline]
    fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}
