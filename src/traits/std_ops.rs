//! Standard operator overloads for [`Op`] expressions.
//!
//! These are sugar over the fallible constructors in [`crate::op`]:
//! `a + b` sums, `a * b` composes, `a * c` scales and `-a` negates.
//! Unlike the constructors they panic on shape mismatch, so reserve
//! them for expressions whose shapes are known to agree.

use std::ops::{Add, Mul, Neg, Sub};

use crate::op::Op;
use crate::scalar::Scalar;

// ──────────────────────────────────────────────
//  Op<S> operators
// ──────────────────────────────────────────────

impl<S: Scalar> Add for Op<S> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Op::sum(self, rhs).expect("operator addition requires matching shapes")
    }
}

impl<S: Scalar> Sub for Op<S> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Op::sum(self, rhs.scale(-S::one())).expect("operator subtraction requires matching shapes")
    }
}

impl<S: Scalar> Mul for Op<S> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Op::compose(self, rhs).expect("operator composition requires matching shapes")
    }
}

impl<S: Scalar> Mul<S> for Op<S> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: S) -> Self {
        self.scale(rhs)
    }
}

impl<S: Scalar> Neg for Op<S> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.scale(-S::one())
    }
}

#[cfg(test)]
mod tests {
    use crate::basics::{Diag, Identity};
    use crate::map::LinearMap;
    use crate::op::Op;

    #[test]
    fn sugar_matches_the_fallible_constructors() {
        let d = Op::new(Diag::from_weights(vec![2.0, 3.0]));
        let i = Op::<f64>::new(Identity::new(2));

        let total = d.clone() + i.clone();
        assert_eq!(total.apply(&[1.0, 1.0]), vec![3.0, 4.0]);

        let chained = d.clone() * d.clone();
        assert_eq!(chained.apply(&[1.0, 1.0]), vec![4.0, 9.0]);

        let scaled = d.clone() * 10.0;
        assert_eq!(scaled.apply(&[1.0, 1.0]), vec![20.0, 30.0]);

        let negated = -(d.clone() - i);
        assert_eq!(negated.apply(&[1.0, 1.0]), vec![-1.0, -2.0]);
    }

    #[test]
    #[should_panic(expected = "composition requires matching shapes")]
    fn composing_mismatched_shapes_panics() {
        let d = Op::new(Diag::from_weights(vec![2.0, 3.0]));
        let i = Op::<f64>::new(Identity::new(3));
        let _ = d * i;
    }
}
