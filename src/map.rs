use crate::scalar::Scalar;
use crate::shape::Shape;

/// A linear map between flat, shaped buffers.
///
/// Implementors provide the forward action and the adjoint action with
/// respect to the standard inner product `<x, y> = sum conj(x_i) y_i`.
/// For a correct implementation the dot test holds for all vectors:
/// `<A x, y> == <x, A* y>`.
///
/// Shape compatibility between operators is validated when composites
/// are constructed. Evaluation itself asserts buffer lengths and
/// panics on mismatch, since by then a wrong length is a caller bug
/// rather than a recoverable condition.
pub trait LinearMap<S: Scalar>: Send + Sync {
    fn in_shape(&self) -> &Shape;

    fn out_shape(&self) -> &Shape;

    /// Forward action `y = A x`. `y` is fully overwritten and must
    /// have length `out_shape().numel()`.
    fn apply_into(&self, x: &[S], y: &mut [S]);

    /// Adjoint action `x = A* y`. `x` is fully overwritten and must
    /// have length `in_shape().numel()`.
    fn apply_adjoint_into(&self, y: &[S], x: &mut [S]);

    /// Allocating forward action.
    fn apply(&self, x: &[S]) -> Vec<S> {
        assert_eq!(
            x.len(),
            self.in_shape().numel(),
            "input length {} does not match operator input shape {}",
            x.len(),
            self.in_shape()
        );
        let mut y = vec![S::zero(); self.out_shape().numel()];
        self.apply_into(x, &mut y);
        y
    }

    /// Allocating adjoint action.
    fn apply_adjoint(&self, y: &[S]) -> Vec<S> {
        assert_eq!(
            y.len(),
            self.out_shape().numel(),
            "input length {} does not match operator output shape {}",
            y.len(),
            self.out_shape()
        );
        let mut x = vec![S::zero(); self.in_shape().numel()];
        self.apply_adjoint_into(y, &mut x);
        x
    }
}

/// The normal operator `A* A` of a borrowed map, without materializing
/// anything.
///
/// `A* A` is Hermitian positive semi-definite, which is what the
/// conjugate-gradient solver requires; its own adjoint is itself.
pub struct Normal<'a, A: ?Sized> {
    inner: &'a A,
}

impl<'a, A: ?Sized> Normal<'a, A> {
    pub fn new(inner: &'a A) -> Self {
        Normal { inner }
    }
}

impl<S: Scalar, A: LinearMap<S> + ?Sized> LinearMap<S> for Normal<'_, A> {
    fn in_shape(&self) -> &Shape {
        self.inner.in_shape()
    }

    fn out_shape(&self) -> &Shape {
        self.inner.in_shape()
    }

    fn apply_into(&self, x: &[S], y: &mut [S]) {
        let mid = self.inner.apply(x);
        self.inner.apply_adjoint_into(&mid, y);
    }

    fn apply_adjoint_into(&self, y: &[S], x: &mut [S]) {
        self.apply_into(y, x);
    }
}
