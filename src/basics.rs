//! Concrete leaf operators: identity, diagonal weighting, small dense
//! matrices and a first-difference stencil.
//!
//! These cover the synthetic systems used in tests and serve as the
//! building blocks users wrap application-specific physics around.

use crate::error::{Error, Result};
use crate::map::LinearMap;
use crate::scalar::Scalar;
use crate::shape::Shape;

/// The identity on any shape.
#[derive(Clone, Debug)]
pub struct Identity {
    shape: Shape,
}

impl Identity {
    pub fn new(shape: impl Into<Shape>) -> Self {
        Identity {
            shape: shape.into(),
        }
    }
}

impl<S: Scalar> LinearMap<S> for Identity {
    fn in_shape(&self) -> &Shape {
        &self.shape
    }

    fn out_shape(&self) -> &Shape {
        &self.shape
    }

    fn apply_into(&self, x: &[S], y: &mut [S]) {
        y.copy_from_slice(x);
    }

    fn apply_adjoint_into(&self, y: &[S], x: &mut [S]) {
        x.copy_from_slice(y);
    }
}

/// Elementwise multiplication by a fixed weight vector.
///
/// The adjoint multiplies by the conjugate weights.
#[derive(Clone, Debug)]
pub struct Diag<S> {
    weights: Vec<S>,
    shape: Shape,
}

impl<S: Scalar> Diag<S> {
    pub fn new(shape: impl Into<Shape>, weights: Vec<S>) -> Result<Self> {
        let shape = shape.into();
        if shape.numel() != weights.len() {
            return Err(Error::ShapeMismatch {
                context: "Diag::new",
                lhs: shape,
                rhs: Shape::from(weights.len()),
            });
        }
        Ok(Diag { weights, shape })
    }

    /// One-dimensional diagonal from a weight vector.
    pub fn from_weights(weights: Vec<S>) -> Self {
        let shape = Shape::from(weights.len());
        Diag { weights, shape }
    }
}

impl<S: Scalar> LinearMap<S> for Diag<S> {
    fn in_shape(&self) -> &Shape {
        &self.shape
    }

    fn out_shape(&self) -> &Shape {
        &self.shape
    }

    fn apply_into(&self, x: &[S], y: &mut [S]) {
        for ((y, &x), &w) in y.iter_mut().zip(x).zip(&self.weights) {
            *y = w * x;
        }
    }

    fn apply_adjoint_into(&self, y: &[S], x: &mut [S]) {
        for ((x, &y), &w) in x.iter_mut().zip(y).zip(&self.weights) {
            *x = w.conj() * y;
        }
    }
}

/// A dense `rows x cols` matrix in row-major order.
///
/// Intended for small systems and tests; large forward models should
/// be expressed as structured operators instead.
#[derive(Clone, Debug)]
pub struct Dense<S> {
    rows: usize,
    cols: usize,
    data: Vec<S>,
    in_shape: Shape,
    out_shape: Shape,
}

impl<S: Scalar> Dense<S> {
    pub fn new(rows: usize, cols: usize, data: Vec<S>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::ShapeMismatch {
                context: "Dense::new",
                lhs: Shape::from([rows, cols]),
                rhs: Shape::from(data.len()),
            });
        }
        Ok(Dense {
            rows,
            cols,
            data,
            in_shape: Shape::from(cols),
            out_shape: Shape::from(rows),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl<S: Scalar> LinearMap<S> for Dense<S> {
    fn in_shape(&self) -> &Shape {
        &self.in_shape
    }

    fn out_shape(&self) -> &Shape {
        &self.out_shape
    }

    fn apply_into(&self, x: &[S], y: &mut [S]) {
        debug_assert_eq!(x.len(), self.cols);
        for (i, out) in y.iter_mut().enumerate() {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            let mut acc = S::zero();
            for (&a, &v) in row.iter().zip(x) {
                acc += a * v;
            }
            *out = acc;
        }
    }

    fn apply_adjoint_into(&self, y: &[S], x: &mut [S]) {
        debug_assert_eq!(y.len(), self.rows);
        for v in x.iter_mut() {
            *v = S::zero();
        }
        for (i, &yi) in y.iter().enumerate() {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            for (out, &a) in x.iter_mut().zip(row) {
                *out += a.conj() * yi;
            }
        }
    }
}

/// Forward first difference on a 1-d signal with a zero boundary:
/// `y_i = x_{i+1} - x_i` for `i < n - 1` and `y_{n-1} = -x_{n-1}`.
#[derive(Clone, Debug)]
pub struct FirstDiff {
    shape: Shape,
}

impl FirstDiff {
    pub fn new(len: usize) -> Self {
        FirstDiff {
            shape: Shape::from(len),
        }
    }
}

impl<S: Scalar> LinearMap<S> for FirstDiff {
    fn in_shape(&self) -> &Shape {
        &self.shape
    }

    fn out_shape(&self) -> &Shape {
        &self.shape
    }

    fn apply_into(&self, x: &[S], y: &mut [S]) {
        let n = x.len();
        for i in 1..n {
            y[i - 1] = x[i] - x[i - 1];
        }
        if n > 0 {
            y[n - 1] = -x[n - 1];
        }
    }

    fn apply_adjoint_into(&self, y: &[S], x: &mut [S]) {
        let n = y.len();
        if n > 0 {
            x[0] = -y[0];
        }
        for i in 1..n {
            x[i] = y[i - 1] - y[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diag_rejects_wrong_weight_count() {
        let err = Diag::new([2, 2], vec![1.0f64; 3]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn dense_matches_hand_computed_product() {
        let a = Dense::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(a.apply(&[1.0, 0.0, -1.0]), vec![-2.0, -2.0]);
        assert_eq!(a.apply_adjoint(&[1.0, 1.0]), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn first_diff_forward_and_adjoint_agree_with_stencil() {
        let d = FirstDiff::new(4);
        assert_eq!(d.apply(&[1.0, 3.0, 6.0, 10.0]), vec![2.0, 3.0, 4.0, -10.0]);
        assert_eq!(
            d.apply_adjoint(&[1.0, 1.0, 1.0, 1.0]),
            vec![-1.0, 0.0, 0.0, 0.0]
        );
    }
}
